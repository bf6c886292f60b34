use eyre::{ensure, Result};

pub fn name(name: &str) -> Result<()> {
    ensure!(!name.is_empty(), "FASTQ title cannot be empty");
    ensure!(
        !name.contains(&['\n', '\r'] as &[char]),
        "Newline characters are not allowed in the FASTQ title: {name}"
    );
    ensure!(
        !name.starts_with(|x: char| x.is_ascii_whitespace()),
        "FASTQ title must start with the read identity: {name:?}"
    );
    Ok(())
}

pub fn seq(seq: &[u8]) -> Result<()> {
    for (i, &x) in seq.iter().enumerate() {
        ensure!(
            x.is_ascii_alphabetic() || x == b'.',
            "Invalid sequence character at index {i} = {:?}",
            x as char
        );
    }
    Ok(())
}

pub fn qual(seq: &[u8], qual: &[u8]) -> Result<()> {
    ensure!(
        seq.len() == qual.len(),
        "Sequence and quality lengths differ: {} != {}",
        seq.len(),
        qual.len()
    );
    Ok(())
}
