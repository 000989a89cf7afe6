use std::fs::File;
use std::path::Path;

use crate::simulator::Access;
use crate::trace::{parse_trace, TraceError};

/// Reads and parses the trace file at `path`
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<Access>, TraceError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::{BufReader, Read};
        let mut bytes = Vec::new();
        BufReader::new(file).read_to_end(&mut bytes)?;
        parse_trace(&bytes)
    }
    // Memory map the file for speed on unix systems, traces are read front to back exactly once
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // The map is only read while the file is open and owned here
        let map = unsafe { Mmap::map(&file)? };
        map.advise(Advice::Sequential)?;
        parse_trace(&map)
    }
}
