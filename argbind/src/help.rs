use argbind_support::AppInfo;

/// Renders the listing shown when no command was selected.
pub trait HelpFormatter: Send + Sync {
    fn global_help(&self, info: &AppInfo, commands: &[(&str, &str)]) -> String;
}

/// One `name - description` line per command, in registration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandListing;

impl HelpFormatter for CommandListing {
    fn global_help(&self, info: &AppInfo, commands: &[(&str, &str)]) -> String {
        let mut lines = Vec::new();
        if !info.description.trim().is_empty() {
            lines.push(info.description.clone());
            lines.push(String::new());
        }
        lines.push("Available sub-commands:".to_string());
        for (name, description) in commands {
            lines.push(format!("  {name} - {description}"));
        }
        lines.push("Pass -h or --help to a sub-command to learn more".to_string());
        lines.join("\n")
    }
}
