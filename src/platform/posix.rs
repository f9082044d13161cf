//! POSIX terminal: termios raw mode, SIGWINCH absorption, and VT100/xterm
//! escape-sequence decoding into integer key events.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::c_int;
use tracing::{debug, trace};

use crate::config::EnvConfig;
use crate::core::keys::{
    ctrl_key, CTRL, DELETE_KEY, DOWN_KEY, END_KEY, HOME_KEY, LEFT_KEY, META, PAGE_DOWN_KEY,
    PAGE_UP_KEY, RIGHT_KEY, UNKNOWN_KEY, UP_KEY,
};
use crate::core::terminal::{ClearRegion, Terminal};

/// Terminals that cannot do cursor motion; the editor falls back to a plain
/// line read for these.
const UNSUPPORTED_TERMS: [&str; 3] = ["dumb", "cons25", "emacs"];

/// How long a lone ESC may dangle before it is reported as the Escape key.
const ESCAPE_TIMEOUT_MS: i32 = 100;

const STDERR_FILENO: c_int = 2;

enum PollOutcome {
    Ready,
    Eof,
    TimedOut,
    Signal,
}

enum ByteOutcome {
    Byte(u8),
    Eof,
    TimedOut,
    Signal,
}

fn write_fd(fd: c_int, data: &[u8]) {
    let mut written = 0;
    while written < data.len() {
        let result = unsafe {
            libc::write(
                fd,
                data[written..].as_ptr() as *const libc::c_void,
                data.len() - written,
            )
        };
        if result <= 0 {
            return;
        }
        written += result as usize;
    }
}

fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

pub struct PosixTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original: Option<libc::termios>,
    raw_enabled: bool,
    resized: Arc<AtomicBool>,
    sigwinch: Option<signal_hook::SigId>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

impl PosixTerminal {
    pub fn new() -> Self {
        Self::with_config(&EnvConfig::from_env())
    }

    pub fn with_config(config: &EnvConfig) -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original: None,
            raw_enabled: false,
            resized: Arc::new(AtomicBool::new(false)),
            sigwinch: None,
            write_log_path: config.write_log.clone(),
            write_log_failed: false,
        }
    }

    fn get_termios(&self) -> io::Result<libc::termios> {
        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(self.stdin_fd, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(termios)
    }

    fn set_termios(&self, termios: &libc::termios) -> io::Result<()> {
        if unsafe { libc::tcsetattr(self.stdin_fd, libc::TCSANOW, termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Poll stdin, distinguishing readiness from timeout and signal wakeup.
    fn poll_stdin(&self, timeout_ms: i32) -> io::Result<PollOutcome> {
        let mut fds = libc::pollfd {
            fd: self.stdin_fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
        if result > 0 {
            if fds.revents & (libc::POLLHUP | libc::POLLERR) != 0
                && fds.revents & libc::POLLIN == 0
            {
                return Ok(PollOutcome::Eof);
            }
            return Ok(PollOutcome::Ready);
        }
        if result == 0 {
            return Ok(PollOutcome::TimedOut);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(PollOutcome::Signal);
        }
        Err(err)
    }

    fn next_byte(&mut self, timeout_ms: i32) -> io::Result<ByteOutcome> {
        match self.poll_stdin(timeout_ms)? {
            PollOutcome::Ready => {}
            PollOutcome::Eof => return Ok(ByteOutcome::Eof),
            PollOutcome::TimedOut => return Ok(ByteOutcome::TimedOut),
            PollOutcome::Signal => return Ok(ByteOutcome::Signal),
        }
        let mut byte = 0u8;
        let result =
            unsafe { libc::read(self.stdin_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        if result == 1 {
            return Ok(ByteOutcome::Byte(byte));
        }
        if result == 0 {
            return Ok(ByteOutcome::Eof);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(ByteOutcome::Signal);
        }
        Err(err)
    }

    fn decode_key(&mut self, first: u8) -> io::Result<i32> {
        match first {
            0x1b => self.decode_escape(),
            byte if byte < 0x80 => Ok(byte as i32),
            byte => self.decode_utf8(byte),
        }
    }

    fn decode_utf8(&mut self, first: u8) -> io::Result<i32> {
        let (mut value, continuations) = match first {
            0xc0..=0xdf => ((first & 0x1f) as u32, 1),
            0xe0..=0xef => ((first & 0x0f) as u32, 2),
            0xf0..=0xf7 => ((first & 0x07) as u32, 3),
            _ => return Ok(UNKNOWN_KEY),
        };
        for _ in 0..continuations {
            match self.next_byte(ESCAPE_TIMEOUT_MS)? {
                ByteOutcome::Byte(byte) if byte & 0xc0 == 0x80 => {
                    value = (value << 6) | (byte & 0x3f) as u32;
                }
                _ => return Ok(UNKNOWN_KEY),
            }
        }
        Ok(char::from_u32(value).map_or(UNKNOWN_KEY, |ch| ch as i32))
    }

    fn decode_escape(&mut self) -> io::Result<i32> {
        let second = match self.next_byte(ESCAPE_TIMEOUT_MS)? {
            ByteOutcome::Byte(byte) => byte,
            _ => return Ok(0x1b),
        };
        match second {
            b'[' => self.decode_csi(),
            b'O' => {
                let third = match self.next_byte(ESCAPE_TIMEOUT_MS)? {
                    ByteOutcome::Byte(byte) => byte,
                    _ => return Ok(UNKNOWN_KEY),
                };
                Ok(match third {
                    b'A' => UP_KEY,
                    b'B' => DOWN_KEY,
                    b'C' => RIGHT_KEY,
                    b'D' => LEFT_KEY,
                    b'H' => HOME_KEY,
                    b'F' => END_KEY,
                    _ => UNKNOWN_KEY,
                })
            }
            0x7f | 0x08 => Ok(META | ctrl_key('H')),
            byte if byte < 0x80 => Ok(META | byte as i32),
            _ => Ok(UNKNOWN_KEY),
        }
    }

    fn decode_csi(&mut self) -> io::Result<i32> {
        let mut params = Vec::with_capacity(8);
        let terminator = loop {
            match self.next_byte(ESCAPE_TIMEOUT_MS)? {
                ByteOutcome::Byte(byte) if (0x40..=0x7e).contains(&byte) => break byte,
                ByteOutcome::Byte(byte) if params.len() < 16 => params.push(byte),
                ByteOutcome::Byte(_) => return Ok(UNKNOWN_KEY),
                _ => return Ok(UNKNOWN_KEY),
            }
        };
        let params = String::from_utf8_lossy(&params);
        let mut fields = params.split(';').map(|field| field.parse::<u32>().ok());
        let first = fields.next().flatten();
        let second = fields.next().flatten();

        let flags = modifier_flags(second);
        match terminator {
            b'A' => Ok(flags | UP_KEY),
            b'B' => Ok(flags | DOWN_KEY),
            b'C' => Ok(flags | RIGHT_KEY),
            b'D' => Ok(flags | LEFT_KEY),
            b'H' => Ok(flags | HOME_KEY),
            b'F' => Ok(flags | END_KEY),
            b'~' => Ok(match first {
                Some(1) | Some(7) => flags | HOME_KEY,
                Some(4) | Some(8) => flags | END_KEY,
                Some(3) => flags | DELETE_KEY,
                Some(5) => flags | PAGE_UP_KEY,
                Some(6) => flags | PAGE_DOWN_KEY,
                _ => UNKNOWN_KEY,
            }),
            _ => Ok(UNKNOWN_KEY),
        }
    }

    fn take_resize_flag(&self) -> bool {
        self.resized.swap(false, Ordering::SeqCst)
    }
}

/// xterm encodes modifiers as `value - 1`: bit 0 shift, bit 1 alt, bit 2
/// ctrl. Shift is not a binding modifier here and is dropped.
fn modifier_flags(param: Option<u32>) -> i32 {
    let Some(value) = param else { return 0 };
    let bits = value.saturating_sub(1);
    let mut flags = 0;
    if bits & 2 != 0 {
        flags |= META;
    }
    if bits & 4 != 0 {
        flags |= CTRL;
    }
    flags
}

impl Default for PosixTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PosixTerminal {
    fn drop(&mut self) {
        let _ = self.disable_raw_mode();
        if let Some(id) = self.sigwinch.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

impl Terminal for PosixTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_enabled {
            return Ok(());
        }
        if self.original.is_none() {
            self.original = Some(self.get_termios()?);
        }
        let mut raw = self.original.expect("saved termios missing");
        raw.c_iflag &=
            !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        self.set_termios(&raw)?;
        if self.sigwinch.is_none() {
            self.sigwinch = Some(signal_hook::flag::register(
                signal_hook::consts::SIGWINCH,
                Arc::clone(&self.resized),
            )?);
        }
        self.raw_enabled = true;
        debug!("raw mode enabled");
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if !self.raw_enabled {
            return Ok(());
        }
        if let Some(original) = self.original.as_ref() {
            let original = *original;
            self.set_termios(&original)?;
        }
        self.raw_enabled = false;
        debug!("raw mode disabled");
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<i32> {
        loop {
            if self.resized.load(Ordering::SeqCst) {
                trace!("resize pending, reporting signal sentinel");
                return Ok(0);
            }
            match self.next_byte(-1)? {
                ByteOutcome::Byte(byte) => return self.decode_key(byte),
                ByteOutcome::Eof => return Ok(0),
                ByteOutcome::Signal => {
                    if self.resized.load(Ordering::SeqCst) {
                        return Ok(0);
                    }
                }
                ByteOutcome::TimedOut => {}
            }
        }
    }

    fn write_text(&mut self, text: &str) {
        write_fd(self.stdout_fd, text.as_bytes());
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(text.as_bytes()));
            if result.is_err() {
                self.write_log_failed = true;
            }
        }
    }

    fn columns(&self) -> usize {
        read_winsize(self.stdout_fd)
            .map(|(cols, _)| cols as usize)
            .unwrap_or(80)
    }

    fn rows(&self) -> usize {
        read_winsize(self.stdout_fd)
            .map(|(_, rows)| rows as usize)
            .unwrap_or(24)
    }

    fn clear(&mut self, region: ClearRegion) {
        match region {
            ClearRegion::Whole => self.write_text("\x1b[H\x1b[2J"),
            ClearRegion::ToEnd => self.write_text("\x1b[J"),
        }
    }

    fn beep(&mut self) {
        write_fd(STDERR_FILENO, b"\x07");
    }

    fn is_tty(&self) -> bool {
        unsafe { libc::isatty(self.stdin_fd) == 1 }
    }

    fn is_unsupported(&self) -> bool {
        match env::var("TERM") {
            Ok(term) => UNSUPPORTED_TERMS
                .iter()
                .any(|name| term.eq_ignore_ascii_case(name)),
            Err(_) => false,
        }
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.disable_raw_mode()?;
        unsafe {
            libc::raise(libc::SIGSTOP);
        }
        self.enable_raw_mode()
    }

    fn take_resize(&mut self) -> bool {
        self.take_resize_flag()
    }
}

#[cfg(test)]
mod tests {
    use super::PosixTerminal;
    use crate::core::keys::{ctrl_key, CTRL, DELETE_KEY, LEFT_KEY, META, RIGHT_KEY, UP_KEY};
    use crate::core::terminal::Terminal;
    use libc::c_int;

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    fn terminal_on(pty: &Pty) -> PosixTerminal {
        let mut terminal = PosixTerminal::new();
        terminal.stdin_fd = pty.slave;
        terminal.stdout_fd = pty.slave;
        terminal
    }

    fn feed(pty: &Pty, bytes: &[u8]) {
        let written = unsafe {
            libc::write(
                pty.master,
                bytes.as_ptr() as *const libc::c_void,
                bytes.len(),
            )
        };
        assert_eq!(written, bytes.len() as isize);
    }

    #[test]
    fn raw_mode_is_saved_and_restored() {
        let pty = open_pty();
        let mut terminal = terminal_on(&pty);
        let before = terminal.get_termios().expect("tcgetattr failed");

        terminal.enable_raw_mode().expect("enable failed");
        let raw = terminal.get_termios().expect("tcgetattr failed");
        assert_eq!(raw.c_lflag & libc::ICANON, 0);
        assert_eq!(raw.c_lflag & libc::ECHO, 0);

        terminal.disable_raw_mode().expect("disable failed");
        let restored = terminal.get_termios().expect("tcgetattr failed");
        assert_eq!(
            restored.c_lflag & libc::ICANON,
            before.c_lflag & libc::ICANON
        );
        // a second disable is a no-op
        terminal.disable_raw_mode().expect("disable failed");
    }

    #[test]
    fn plain_and_control_bytes_pass_through() {
        let pty = open_pty();
        let mut terminal = terminal_on(&pty);
        terminal.enable_raw_mode().expect("enable failed");

        feed(&pty, b"a\x12\x7f");
        assert_eq!(terminal.read_key().expect("read failed"), 'a' as i32);
        assert_eq!(terminal.read_key().expect("read failed"), ctrl_key('R'));
        assert_eq!(terminal.read_key().expect("read failed"), 127);

        terminal.disable_raw_mode().expect("disable failed");
    }

    #[test]
    fn escape_sequences_decode_to_synthetic_keys() {
        let pty = open_pty();
        let mut terminal = terminal_on(&pty);
        terminal.enable_raw_mode().expect("enable failed");

        feed(&pty, b"\x1b[A\x1b[3~\x1b[1;5C\x1b[1;3D\x1bOA");
        assert_eq!(terminal.read_key().expect("read failed"), UP_KEY);
        assert_eq!(terminal.read_key().expect("read failed"), DELETE_KEY);
        assert_eq!(terminal.read_key().expect("read failed"), CTRL | RIGHT_KEY);
        assert_eq!(terminal.read_key().expect("read failed"), META | LEFT_KEY);
        assert_eq!(terminal.read_key().expect("read failed"), UP_KEY);

        terminal.disable_raw_mode().expect("disable failed");
    }

    #[test]
    fn meta_prefix_and_utf8_decode() {
        let pty = open_pty();
        let mut terminal = terminal_on(&pty);
        terminal.enable_raw_mode().expect("enable failed");

        feed(&pty, b"\x1bb\x1b\x7f");
        assert_eq!(terminal.read_key().expect("read failed"), META | 'b' as i32);
        assert_eq!(
            terminal.read_key().expect("read failed"),
            META | ctrl_key('H')
        );

        feed(&pty, "é漢".as_bytes());
        assert_eq!(terminal.read_key().expect("read failed"), 'é' as i32);
        assert_eq!(terminal.read_key().expect("read failed"), '漢' as i32);

        terminal.disable_raw_mode().expect("disable failed");
    }

    #[test]
    fn resize_flag_surfaces_as_the_signal_sentinel() {
        let pty = open_pty();
        let mut terminal = terminal_on(&pty);
        terminal
            .resized
            .store(true, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(terminal.read_key().expect("read failed"), 0);
        assert!(terminal.take_resize());
        assert!(!terminal.take_resize());
    }
}
