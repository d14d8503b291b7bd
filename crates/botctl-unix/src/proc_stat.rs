use std::fs;

/// The fields of `/proc/<pid>/stat` botctl cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStat {
    /// Single-letter scheduler state (`R`, `S`, `Z`, ...).
    pub state: char,
    /// Start time in clock ticks since boot. Unique per PID incarnation.
    pub start_time: u64,
}

impl ProcStat {
    pub fn is_zombie(&self) -> bool {
        matches!(self.state, 'Z' | 'X')
    }
}

/// Reads `/proc/<pid>/stat`. Returns `None` if it is unavailable
/// (process gone, or not Linux).
pub fn read(pid: u32) -> Option<ProcStat> {
    let contents = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    parse(&contents)
}

/// Parses the contents of a `stat` file.
///
/// Field 2 (`comm`) is parenthesised and may itself contain spaces and
/// parentheses, so parsing starts after the LAST `)`.
pub fn parse(contents: &str) -> Option<ProcStat> {
    let after_comm = contents.rsplit_once(')')?.1;
    let tokens: Vec<&str> = after_comm.split_whitespace().collect();
    // tokens[0] is field 3 (state); field 22 (starttime) is tokens[19].
    let state = tokens.first()?.chars().next()?;
    let start_time = tokens.get(19)?.parse().ok()?;
    Some(ProcStat { state, start_time })
}
