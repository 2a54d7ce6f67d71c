use std::io::{self, Write};
use std::panic;

pub fn initialize_panic_handler() {
    better_panic::install();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Record the panic in the log file before the backtrace hits stderr
        log::error!("pdfbridge panicked: {panic_info}");
        flush_stdout();

        default_hook(panic_info);

        std::process::exit(1);
    }));
}

/// Flush partially written callback output so the replay stays line-complete
pub fn flush_stdout() {
    let mut stdout = io::stdout();
    let _ = stdout.flush();
}
