use anyhow::Result;

use crate::keys::{code_bindings, NavCommand};

fn describe(command: Option<NavCommand>) -> String {
    match command {
        Some(NavCommand::Move(direction)) => format!("move {}", direction.label()),
        Some(NavCommand::Activate) => "activate".to_string(),
        Some(NavCommand::Back) => "back".to_string(),
        Some(NavCommand::Media(media)) => format!("media {:?}", media),
        None => "(suppressed)".to_string(),
    }
}

/// Every recognized key code with its vendor table and command
pub fn format_key_table() -> String {
    let mut output = String::new();
    output.push_str(&format!("{:>6}  {:<14}  {:<12}  {}\n", "CODE", "VENDOR", "KEY", "COMMAND"));
    output.push_str(&format!("{}\n", "─".repeat(56)));
    for (code, binding) in code_bindings() {
        output.push_str(&format!(
            "{:>6}  {:<14}  {:<12}  {}\n",
            code,
            binding.vendor.label(),
            binding.key.name(),
            describe(binding.key.command())
        ));
    }
    output
}

pub fn run() -> Result<()> {
    print!("{}", format_key_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_table_lists_vendor_codes() {
        let table = format_key_table();
        let row = |code: &str| {
            table
                .lines()
                .find(|l| l.split_whitespace().next() == Some(code))
                .unwrap()
                .to_string()
        };
        assert!(row("10009").contains("samsung/tizen"));
        assert!(row("10009").ends_with("back"));
        assert!(row("461").contains("webos"));
        assert!(row("39").ends_with("move right"));
        assert!(row("93").ends_with("(suppressed)"));
        assert_eq!(table.lines().count(), code_bindings().len() + 2);
    }
}
