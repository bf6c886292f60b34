use eyre::Result;

/// A trait for reading structured records. Modeled after the `Read` trait in the std.
pub trait ReadRecord {
    /// The type of the records that will be read.
    type Record;

    /// Read a single record from the input into the provided buffer.
    /// Returns `true` if a record was read and `false` if the end of the input was reached.
    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool>;

    /// Fill a buffer with records from the input. Returns the number of records read, which could
    /// be less than the length of the buffer or equals 0 if the end of the input is reached.
    fn read_records(&mut self, into: &mut [Self::Record]) -> Result<usize> {
        let mut n = 0;
        for buf in into {
            if !self.read_record(buf)? {
                break;
            }
            n += 1;
        }
        Ok(n)
    }

    /// Read all records from the input into the provided buffer.
    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize>;
}

/// A trait for writing structured records. Modeled after the `Write` trait in the std.
pub trait WriteRecord {
    type Record;

    /// Write a single record.
    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Write a slice of records. Stops at the first error.
    fn write_records(&mut self, records: &[Self::Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush the output.
    fn flush(&mut self) -> Result<()>;
}

impl<T: ReadRecord + ?Sized> ReadRecord for Box<T> {
    type Record = T::Record;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        (**self).read_record(into)
    }

    fn read_records(&mut self, into: &mut [Self::Record]) -> Result<usize> {
        (**self).read_records(into)
    }

    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize> {
        (**self).read_to_end(into)
    }
}

impl<T: WriteRecord + ?Sized> WriteRecord for Box<T> {
    type Record = T::Record;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        (**self).write_record(record)
    }

    fn write_records(&mut self, records: &[Self::Record]) -> Result<()> {
        (**self).write_records(records)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
