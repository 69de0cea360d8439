//! Command handlers

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::device::DeviceControl;

/// Handler signature shared by every table entry.
pub type Handler =
    fn(&ParsedCommand, &mut dyn DeviceControl, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    /// Lower-case letters (or symbols) that select this command
    pub keys: &'static [u8],
    /// Syntax column of the help listing, padded as printed
    pub usage: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { keys: b"h?", usage: "h or ?", brief: "Print this help", handler: cmd_help },
    CommandDescriptor { keys: b"g", usage: "g      ", brief: "Print the current gain and delay settings", handler: cmd_status },
    CommandDescriptor { keys: b"c", usage: "C      ", brief: "Toggle printing of CPU and Memory usage", handler: cmd_toggle_diagnostics },
    CommandDescriptor { keys: b"k", usage: "k <dB> ", brief: "Set digital gain in dB (example: k 10)", handler: cmd_gain },
    CommandDescriptor { keys: b"d", usage: "d <ms> ", brief: "Set delay time in ms (example: d 25)", handler: cmd_delay },
];

/// Find the descriptor for a command letter, ignoring ASCII case.
pub fn find_command(letter: u8) -> Option<&'static CommandDescriptor> {
    let key = letter.to_ascii_lowercase();
    COMMANDS.iter().find(|c| c.keys.contains(&key))
}

/// Execute a parsed command
///
/// Unknown letters print a diagnostic and return
/// [`ConsoleError::UnknownCommand`].
pub fn execute(
    cmd: &ParsedCommand,
    device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    match find_command(cmd.command) {
        Some(descriptor) => (descriptor.handler)(cmd, device, out),
        None => {
            let _ = writeln!(out, "Unknown command: {}", cmd.echo());
            let _ = writeln!(out, "Type 'h' for help.");
            Err(ConsoleError::UnknownCommand)
        }
    }
}

/// Print the command listing
pub fn print_help(out: &mut dyn Write) {
    let _ = writeln!(out);
    let _ = writeln!(out, "SerialManager Help: Available Commands:");
    for c in COMMANDS {
        let _ = writeln!(out, "   {}: {}", c.usage, c.brief);
    }
    let _ = writeln!(out);
}

// --- Command Implementations ---

fn cmd_help(
    _cmd: &ParsedCommand,
    _device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    print_help(out);
    Ok(())
}

fn cmd_status(
    _cmd: &ParsedCommand,
    device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    device.print_gain_settings(out);
    let _ = writeln!(out, "Delay = {:.2} ms", device.delay_ms());
    Ok(())
}

fn cmd_toggle_diagnostics(
    _cmd: &ParsedCommand,
    device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    let _ = writeln!(out, "Command Received: toggle printing of memory and CPU usage.");
    device.toggle_diagnostics();
    Ok(())
}

fn cmd_gain(
    cmd: &ParsedCommand,
    device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    match cmd.arg {
        Some(gain_db) => {
            device.set_gain_db(gain_db);
            Ok(())
        }
        None => {
            let _ = writeln!(out, "Usage: k <dB>   (current = {:.1} dB)", device.gain_db());
            Err(ConsoleError::MissingArg)
        }
    }
}

fn cmd_delay(
    cmd: &ParsedCommand,
    device: &mut dyn DeviceControl,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    match cmd.arg {
        Some(delay_ms) => {
            device.set_delay_ms(delay_ms);
            Ok(())
        }
        None => {
            let _ = writeln!(out, "Usage: d <ms>   (current = {:.2} ms)", device.delay_ms());
            Err(ConsoleError::MissingArg)
        }
    }
}
