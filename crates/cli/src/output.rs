//! Terminal output. Results go to stdout, notices to stderr.

use std::fmt::Display;

use teamall_client::notify::{Notice, NoticeLevel};

#[allow(clippy::print_stdout)]
pub fn line(text: impl Display) {
    println!("{text}");
}

#[allow(clippy::print_stderr)]
pub fn notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    eprintln!("[{tag}] {}", notice.message);
}
