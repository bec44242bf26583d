//! Persisted histogram reports.
//!
//! Each successful worker leaves behind one file named after its process
//! identity, holding 26 `letter=count` lines in alphabetical order.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::Pid;

use crate::error::Result;
use crate::histogram::Histogram;

/// Report file name for a worker, derived from its pid.
pub fn report_path(dir: &Path, pid: Pid) -> PathBuf {
    dir.join(format!("file{}.hist", pid))
}

/// Write a worker's histogram to its report file.
pub fn write_report(dir: &Path, pid: Pid, histogram: &Histogram) -> Result<PathBuf> {
    let path = report_path(dir, pid);
    let mut contents = String::with_capacity(Histogram::WIRE_LEN);
    for (letter, count) in histogram.iter() {
        writeln!(contents, "{letter}={count}").expect("writing to a String cannot fail");
    }
    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_path_uses_pid() {
        let path = report_path(Path::new("/tmp/out"), Pid::from_raw(4242));
        assert_eq!(path, Path::new("/tmp/out/file4242.hist"));
    }

    #[test]
    fn test_report_has_26_alphabetical_lines() {
        let dir = tempdir().unwrap();
        let histogram = Histogram::of_bytes(b"AbcAbc");

        let path = write_report(dir.path(), Pid::from_raw(7), &histogram).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert!(contents.ends_with('\n'));
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 26);
        assert_eq!(lines[0], "a=2");
        assert_eq!(lines[1], "b=2");
        assert_eq!(lines[2], "c=2");
        assert!(lines[3..].iter().all(|line| line.ends_with("=0")));

        // Lines are alphabetical: first byte of line i is 'a' + i.
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.as_bytes()[0], b'a' + i as u8);
        }
    }

    #[test]
    fn test_empty_histogram_report_is_all_zeros() {
        let dir = tempdir().unwrap();
        let histogram = Histogram::of_bytes(b"");

        let path = write_report(dir.path(), Pid::from_raw(8), &histogram).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert_eq!(contents.lines().count(), 26);
        assert!(contents.lines().all(|line| line.ends_with("=0")));
    }
}
