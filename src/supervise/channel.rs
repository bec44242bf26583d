//! Result channels between workers and the supervisor.
//!
//! Each worker gets a private pipe. The worker writes exactly one
//! fixed-width histogram message into its end and closes it; the supervisor
//! performs a single bounded read after the worker terminates. With only
//! one message per channel no framing is needed.

use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::process::Stdio;

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};

use crate::error::{ParhistError, Result};
use crate::histogram::Histogram;

/// Create the channel for one worker.
///
/// The read end belongs to the supervisor and is non-blocking; the write
/// end is handed to the worker as its stdout at spawn time. Each endpoint
/// is closed exactly once, by its owner, when it drops.
pub fn result_channel() -> Result<(ChannelReader, ChannelWriter)> {
    let (read_fd, write_fd) = nix::unistd::pipe()?;
    set_nonblocking(&read_fd)?;
    Ok((ChannelReader { fd: read_fd }, ChannelWriter { fd: write_fd }))
}

fn set_nonblocking(fd: &OwnedFd) -> Result<()> {
    let bits = fcntl(fd, FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_retain(bits) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Supervisor-owned read end of a worker's result channel.
pub struct ChannelReader {
    fd: OwnedFd,
}

impl ChannelReader {
    /// Perform the single bounded read for this worker's histogram.
    ///
    /// A short read, EOF, or an empty pipe all mean the worker died before
    /// transmitting a full result; none of them is an error.
    pub fn read_result(&mut self) -> Result<Option<Histogram>> {
        let mut buf = [0u8; Histogram::WIRE_LEN];
        let mut filled = 0;
        while filled < buf.len() {
            match nix::unistd::read(&self.fd, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(Errno::EINTR) => continue,
                Err(Errno::EAGAIN) => break,
                Err(e) => return Err(ParhistError::Sys(e)),
            }
        }
        if filled < buf.len() {
            return Ok(None);
        }
        Ok(Some(Histogram::from_wire(&buf)))
    }
}

impl AsFd for ChannelReader {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for ChannelReader {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Worker-owned write end of a result channel.
///
/// In the supervisor this is consumed into the child's stdout at spawn
/// time; in the worker it is reconstructed from the inherited descriptor.
pub struct ChannelWriter {
    fd: OwnedFd,
}

impl ChannelWriter {
    /// Wrap an inherited descriptor as a channel write end.
    ///
    /// # Safety
    /// `fd` must be a valid open descriptor that the caller owns; it is
    /// closed when the writer drops.
    pub unsafe fn from_raw(fd: RawFd) -> Self {
        Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        }
    }

    /// Convert into a Stdio for wiring up as a worker's stdout.
    pub fn into_stdio(self) -> Stdio {
        Stdio::from(self.fd)
    }

    /// Transmit a histogram as the channel's one message.
    pub fn send(&mut self, histogram: &Histogram) -> Result<()> {
        let buf = histogram.to_wire();
        let mut written = 0;
        while written < buf.len() {
            match nix::unistd::write(&self.fd, &buf[written..]) {
                Ok(n) => written += n,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ParhistError::Sys(e)),
            }
        }
        Ok(())
    }
}

impl AsFd for ChannelWriter {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for ChannelWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
