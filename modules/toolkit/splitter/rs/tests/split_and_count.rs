use bstr::BString;
use cbumi_io_rs::alignment::{self, Format};
use cbumi_io_rs::{ReadRecord, WriteRecord};
use cbumi_splitter_rs::{
    discover, split_file, validate_partitions, write_summary, Aggregator, HandlePolicy,
    MarkerLabel, TagCounts,
};
use eyre::Result;
use noodles::sam;
use noodles::sam::alignment::RecordBuf;
use rayon::ThreadPoolBuilder;
use std::path::Path;
use std::sync::Arc;

const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:1000\n@CO\tcbumi test\n";

fn header() -> Result<Arc<sam::Header>> {
    Ok(Arc::new(HEADER.parse()?))
}

fn write_alignments(path: &Path, names: &[&str]) -> Result<()> {
    let mut writer = alignment::Writer::create(path, Format::infer_from_path(path), header()?)?;
    for name in names {
        writer.write_record(&RecordBuf::builder().set_name(BString::from(*name)).build())?;
    }
    writer.finish()
}

fn names(path: &Path) -> Result<Vec<String>> {
    let mut reader = alignment::Reader::from_path(path)?;
    let mut records = Vec::new();
    reader.read_to_end(&mut records)?;
    Ok(records
        .iter()
        .filter_map(|x| x.name().map(|n| n.to_string()))
        .collect())
}

const READS: [&str; 8] = [
    "AAAA_TTGG_1_R1",
    "CCCC_TTGG_2_R1",
    "AAAA_TTGG_1_R2",
    "broken_name",
    "GGGG_ACAC_3_R1",
    "CCCC_TTGG_2_R2",
    "AAAA_GGTT_4_R1",
    "../etc_x_y_z",
];

#[test]
fn test_split_bam_by_barcode() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sample.bam");
    write_alignments(&input, &READS)?;

    for (i, (format, policy)) in [
        (Format::Sam, HandlePolicy::default()),
        (Format::Sam, HandlePolicy::Reopen),
        (Format::Bam, HandlePolicy::default()),
    ]
    .into_iter()
    .enumerate()
    {
        let outdir = dir.path().join(format!("split_{i}"));
        let routing = split_file(&input, &outdir, format, policy)?;

        assert_eq!(*routing.seen(), 8);
        assert_eq!(*routing.routed(), 6);
        assert_eq!(*routing.unroutable(), 2);
        validate_partitions(&routing, &*header()?)?;

        let barcodes: Vec<&str> = routing
            .partitions()
            .iter()
            .map(|x| x.barcode().as_str())
            .collect();
        assert_eq!(barcodes, ["AAAA", "CCCC", "GGGG"]);

        for partition in routing.partitions() {
            let expected = outdir.join(format!("sample_{}.{}", partition.barcode(), format));
            assert_eq!(partition.path(), &expected);

            let names = names(partition.path())?;
            assert_eq!(names.len() as u64, *partition.records());
            for name in names {
                assert_eq!(name.split('_').next(), Some(partition.barcode().as_str()));
            }
        }
        assert_eq!(
            names(&outdir.join(format!("sample_AAAA.{format}")))?,
            ["AAAA_TTGG_1_R1", "AAAA_TTGG_1_R2", "AAAA_GGTT_4_R1"]
        );
        assert_eq!(std::fs::read_dir(&outdir)?.count(), 3);
    }
    Ok(())
}

#[test]
fn test_sam_partitions_start_with_the_header() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sample.sam");
    write_alignments(&input, &READS)?;

    let outdir = dir.path().join("split_bam_files_sam");
    let routing = split_file(&input, &outdir, Format::Sam, HandlePolicy::Reopen)?;
    for partition in routing.partitions() {
        let content = std::fs::read_to_string(partition.path())?;
        assert!(content.starts_with(HEADER));
        assert_eq!(content.matches("@HD").count(), 1);
    }
    Ok(())
}

#[test]
fn test_validation_rejects_a_foreign_header() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sample.sam");
    write_alignments(&input, &READS)?;

    let routing = split_file(&input, dir.path().join("out"), Format::Sam, HandlePolicy::default())?;
    validate_partitions(&routing, &*header()?)?;

    let path = routing.partitions()[1].path();
    let content = std::fs::read_to_string(path)?;
    std::fs::write(path, content.replace("@CO\tcbumi test", "@CO\tcbumi edit"))?;
    assert!(validate_partitions(&routing, &*header()?).is_err());
    Ok(())
}

#[test]
fn test_header_lines_come_out_in_canonical_order() -> Result<()> {
    let source = "@HD\tVN:1.6\n@CO\tbefore the references\n@SQ\tSN:chr1\tLN:1000\n";
    let canonical = "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\n@CO\tbefore the references\n";
    let record = "AAAA_TTGG_1_R1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n";

    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sample.sam");
    std::fs::write(&input, format!("{source}{record}"))?;

    let routing = split_file(&input, dir.path().join("out"), Format::Sam, HandlePolicy::Reopen)?;
    let parsed: sam::Header = source.parse()?;
    assert_eq!(alignment::header_text(&parsed)?, canonical);
    validate_partitions(&routing, &parsed)?;

    let content = std::fs::read_to_string(routing.partitions()[0].path())?;
    assert!(content.starts_with(canonical));
    assert!(!content.starts_with(source));
    Ok(())
}

#[test]
fn test_missing_input() {
    assert!(split_file(
        "/nonexistent/sample.bam",
        "/nonexistent/out",
        Format::Sam,
        HandlePolicy::default()
    )
    .is_err());
}

#[test]
fn test_count_tags_per_container() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("x_cc3_srtn_AAAA.deduplicated.srt.bam");
    let second = dir.path().join("other.srt.bam");
    write_alignments(&first, &["AAAA_TT_1_R1", "AAAA_GG_2_R1", "AAAA_TT_3_R2"])?;
    write_alignments(&second, &["CCCC_TT_1_R2", "CCCC_TT_2_R2"])?;
    write_alignments(&dir.path().join("ignored.bam"), &["GGGG_TT_1_R1"])?;

    assert_eq!(TagCounts::from_path(&first)?.get(b"R1"), 2);

    let containers = discover(dir.path(), "srt.bam")?;
    assert_eq!(containers, [second.clone(), first.clone()]);

    let labeler = MarkerLabel::default();
    let pool = ThreadPoolBuilder::new().num_threads(2).build()?;
    let details = dir.path().join("details");
    let mut aggregator = Aggregator::new(pool, |path: &Path| labeler.label(path));
    aggregator.set_detail_dir(&details);
    let summaries = aggregator.run(&containers)?;

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].label(), "other.srt");
    assert_eq!(summaries[1].label(), "AAAA");

    let counts = summaries[1].counts();
    assert_eq!(counts.get(b"R1"), 2);
    assert_eq!(counts.get(b"R2"), 1);
    assert_eq!(counts.unique(), 2);
    assert_eq!(counts.total(), 3);

    assert_eq!(
        std::fs::read_to_string(details.join("x_cc3_srtn_AAAA.deduplicated.srt.bam.reads.info.txt"))?,
        "tag\tcount\nR1\t2\nR2\t1\n"
    );
    assert_eq!(
        std::fs::read_to_string(details.join("other.srt.bam.reads.info.txt"))?,
        "tag\tcount\nR2\t2\n"
    );

    let mut buffer = Vec::new();
    write_summary(&mut buffer, &summaries)?;
    assert_eq!(
        String::from_utf8(buffer)?,
        "label\tunique_tag_count\ttotal_read_count\nother.srt\t1\t2\nAAAA\t2\t3\n"
    );
    Ok(())
}
