use nix::sys::signal::Signal;
use nix::unistd::{getuid, User};
use std::str::FromStr;

const SIGNAL_NAMES: [&str; 31] = [
    "SIGHUP", "SIGINT", "SIGQUIT", "SIGILL", "SIGTRAP", "SIGABRT", "SIGEMT", "SIGFPE", "SIGKILL",
    "SIGBUS", "SIGSEGV", "SIGSYS", "SIGPIPE", "SIGALRM", "SIGTERM", "SIGURG", "SIGSTOP",
    "SIGTSTP", "SIGCONT", "SIGCHLD", "SIGTTIN", "SIGTTOU", "SIGIO", "SIGXCPU", "SIGXFSZ",
    "SIGVTALRM", "SIGPROF", "SIGWINCH", "SIGINFO", "SIGUSR1", "SIGUSR2",
];

/// Kill signals offered in the settings menu, in display order. Names the
/// current platform does not define are left out.
pub fn signal_map() -> Vec<(&'static str, i32)> {
    SIGNAL_NAMES
        .iter()
        .filter_map(|name| Signal::from_str(name).ok().map(|sig| (*name, sig as i32)))
        .collect()
}

pub fn signal_names() -> Vec<&'static str> {
    signal_map().into_iter().map(|(name, _)| name).collect()
}

pub fn signal_number(name: &str) -> Option<i32> {
    signal_map()
        .into_iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| number)
}

pub fn current_user() -> Option<String> {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => Some(user.name),
        _ => std::env::var("USER").ok(),
    }
}

/// Icon prefix for a process row: a skull when clicking kills one of our own
/// processes, a no-entry sign when the process belongs to someone else.
pub fn process_icon(process_owner: &str, click_to_kill: bool) -> &'static str {
    if !click_to_kill {
        return "";
    }
    match current_user() {
        Some(user) if user == process_owner => ":skull:",
        _ => ":no_entry_sign:",
    }
}
