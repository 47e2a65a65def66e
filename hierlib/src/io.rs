use std::fs::File;
use std::io::BufRead;
use crate::error::TraceError;

/// Opens a trace file for sequential reading
pub fn get_reader(file: File) -> Result<impl BufRead, TraceError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 64 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file on unix systems, traces are only ever read front to back
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // SAFETY: the trace is treated as read-only input; truncating it underneath a running
        // simulation is not supported
        let mmap = unsafe { Mmap::map(&file)? };
        mmap.advise(Advice::Sequential)?;
        Ok(Cursor::new(mmap))
    }
}
