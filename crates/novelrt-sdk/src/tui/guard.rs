//! Keep the terminal usable when the process ends abnormally

/// Exit status used when the user interrupts with Ctrl+C
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Make the cursor visible again
pub fn restore_cursor() {
    let _ = console::Term::stderr().show_cursor();
}

/// Restore the cursor on panic and on Ctrl+C
pub fn install_terminal_guards() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_cursor();
        default_panic(info);
    }));

    if let Err(e) = ctrlc::set_handler(|| {
        restore_cursor();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }) {
        log::debug!("Could not install the Ctrl+C handler: {}", e);
    }
}
