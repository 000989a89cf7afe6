use std::env;
use std::error::Error;
use std::fs;
use std::process;

use crate::io::read_trace;
use crate::simulator::Access;
use crate::trace::{parse_access, parse_trace, TraceError};

#[test]
fn parses_operations_and_addresses() {
    assert_eq!(parse_access("L 0x1000"), Some(Access::load(0x1000)));
    assert_eq!(parse_access("r ff"), Some(Access::load(0xff)));
    assert_eq!(parse_access("  W\t0XDEADBEEF  "), Some(Access::store(0xdead_beef)));
    assert_eq!(parse_access("s FFFFFFFFFFFFFFFF"), Some(Access::store(u64::MAX)));
    assert_eq!(parse_access("S 1FFFFFFFFFFFFFFFF"), None);
    assert_eq!(parse_access("X 10"), None);
    assert_eq!(parse_access("L"), None);
    assert_eq!(parse_access("L 0xzz"), None);
}

#[test]
fn skips_comments_and_blank_lines() -> Result<(), Box<dyn Error>> {
    let trace = b"# warm up\nL 0\n\n   \nS 0x4\n# done\nL 0\n";
    assert_eq!(parse_trace(trace)?, vec![Access::load(0), Access::store(4), Access::load(0)]);
    Ok(())
}

#[test]
fn reports_the_malformed_line() {
    match parse_trace(b"L 0\nS 4\nload 8\n") {
        Err(TraceError::Malformed { line, content }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "load 8");
        }
        other => panic!("expected a malformed line, got {other:?}"),
    }
    assert!(matches!(parse_trace(&[b'L', b' ', 0xff]), Err(TraceError::NotUtf8(_))));
}

#[test]
fn reads_trace_files() -> Result<(), Box<dyn Error>> {
    let directory = env::temp_dir();
    let path = directory.join(format!("stratumlib-trace-{}.txt", process::id()));
    fs::write(&path, "L 0x40\nS 0x80\n")?;
    let accesses = read_trace(&path);
    fs::remove_file(&path)?;
    assert_eq!(accesses?, vec![Access::load(0x40), Access::store(0x80)]);

    let empty = directory.join(format!("stratumlib-empty-{}.txt", process::id()));
    fs::write(&empty, "")?;
    let accesses = read_trace(&empty);
    fs::remove_file(&empty)?;
    assert!(accesses?.is_empty());

    assert!(matches!(read_trace(directory.join("stratumlib-missing.txt")), Err(TraceError::Io(_))));
    Ok(())
}
