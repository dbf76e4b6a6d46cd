//! Terminal output helpers.

use std::io::Write;

/// Redisplay the prompt after printing something
pub fn redisplay_prompt(name: &str) {
    print!("{}> ", name);
    std::io::stdout().flush().ok();
}

/// Print notices and restore the prompt
pub fn print_notices(notices: &[String], name: &str) {
    if notices.is_empty() {
        return;
    }
    for notice in notices {
        print!("{}", notice);
        if !notice.ends_with('\n') {
            println!();
        }
    }
    redisplay_prompt(name);
}
