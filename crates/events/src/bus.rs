use super::models::{AppEvent, EventBus};
use colored::Colorize;
use parking_lot::Mutex;
use std::sync::Arc;

impl EventBus {
    pub fn new(silent_mode: bool) -> Arc<Self> {
        Arc::new(Self {
            silent_mode,
            recorded: None,
        })
    }

    /// Silent bus that keeps every emitted event for later inspection
    pub fn recording() -> Arc<Self> {
        Arc::new(Self {
            silent_mode: true,
            recorded: Some(Mutex::new(Vec::new())),
        })
    }

    /// Drains the captured events (empty for non-recording buses)
    pub fn take_recorded(&self) -> Vec<AppEvent> {
        self.recorded
            .as_ref()
            .map(|events| std::mem::take(&mut *events.lock()))
            .unwrap_or_default()
    }

    pub fn emit(&self, event: AppEvent) {
        if event.is_failure() {
            tracing::error!(?event, "user-facing failure");
        }

        if !self.silent_mode {
            render(&event);
        }

        if let Some(recorded) = &self.recorded {
            recorded.lock().push(event);
        }
    }
}

fn render(event: &AppEvent) {
    match event {
        // Application lifecycle
        AppEvent::Starting => {
            println!("\n{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
            println!("  {}", "SnapVault - Private Photo Locker".white().bold());
            println!("  {} {}", "Version".dimmed(), env!("CARGO_PKG_VERSION").cyan());
            println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
        }
        AppEvent::Shutdown => {
            println!("\n{}", "Goodbye".red());
        }

        // Configuration
        AppEvent::ConfigLoading { path } => {
            println!("  {} {}", "Loading config".dimmed(), path.cyan());
        }
        AppEvent::ConfigLoaded { users_count } => {
            if *users_count == 0 {
                println!("  {} No users configured", "⚠".yellow());
            } else {
                println!("  {} {} user(s)", "✓".green(), users_count.to_string().cyan());
            }
        }
        AppEvent::ConfigCreated { path } => {
            tracing::warn!("Configuration file not found");
            tracing::info!("Created default configuration at: {}", path);
        }
        AppEvent::ConfigMigrated { added_fields } => {
            if !added_fields.is_empty() {
                println!(
                    "  {} Config updated: added {}",
                    "↻".blue(),
                    added_fields.join(", ").dimmed()
                );
            }
        }

        // Authentication
        AppEvent::SignedIn { username, first_time } => {
            if *first_time {
                println!("  {} Welcome, {}", "✓".green(), username.cyan());
            } else {
                println!("  {} Welcome back, {}", "✓".green(), username.cyan());
            }
        }
        AppEvent::ConfirmationRequired { username } => {
            println!(
                "  {} Are you a new user, {}? Provide your email to confirm your first login",
                "?".yellow(),
                username.cyan()
            );
        }
        AppEvent::SignInRejected { reason } => {
            println!("  {} {}", "✗".red(), reason);
        }
        AppEvent::SignedOut => {
            println!("  {} Signed out", "←".dimmed());
        }
        AppEvent::SignOutFailed { error } => {
            println!("  {} Error signing out ({}). Please try again", "✗".red(), error.dimmed());
        }

        // Registry lifecycle
        AppEvent::RegistryLoaded { local, remote } => {
            println!(
                "  {} {} local, {} in cloud",
                "✓".green(),
                local.to_string().cyan(),
                remote.to_string().cyan()
            );
        }
        AppEvent::RemoteListFailed { error } => {
            println!("  {} Unable to load cloud files ({})", "⚠".yellow(), error.dimmed());
        }
        AppEvent::RegistryDiscarded => {
            // Silent
        }

        // Image screen
        AppEvent::ImageLoaded { name, width, height } => {
            println!("  {} {} ({}x{})", "▣".blue(), name.cyan(), width, height);
        }
        AppEvent::FilterApplied { name } => {
            println!("  {} Red filter applied to {}", "✎".red(), name.cyan());
        }
        AppEvent::ImageCleared => {
            // Silent
        }

        // Storage outcomes
        AppEvent::SavedLocally { name } => {
            println!("  {} Saved {} locally", "✓".green(), name.cyan());
        }
        AppEvent::UploadComplete { name } => {
            println!("  {} {} uploaded to cloud", "↑".green(), name.cyan());
        }
        AppEvent::UploadFailed { name, error } => {
            println!("  {} Upload of {} failed ({}). Please try again", "✗".red(), name.cyan(), error.dimmed());
        }
        AppEvent::DownloadComplete { name } => {
            println!("  {} {} downloaded from cloud", "↓".green(), name.cyan());
        }
        AppEvent::DownloadFailed { name, error } => {
            println!("  {} Unable to load {} from cloud ({})", "✗".red(), name.cyan(), error.dimmed());
        }
        AppEvent::RemoteDeleteFailed { name, error } => {
            println!(
                "  {} Error removing {} from the cloud ({}). Please try again",
                "✗".red(),
                name.cyan(),
                error.dimmed()
            );
        }
        AppEvent::FileDeleted { name } => {
            println!("  {} Deleted {}", "-".red(), name.cyan());
        }
        AppEvent::LocalIoFailed { name, error } => {
            println!("  {} An error occurred processing {}. Please try again", "✗".red(), name.cyan());
        }

        // Errors
        AppEvent::Error { context, error } => {
            println!("  {} {}: {}", "✗".red(), context, error.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_bus_captures_in_order() {
        let bus = EventBus::recording();
        bus.emit(AppEvent::SavedLocally { name: "cat.png".to_string() });
        bus.emit(AppEvent::UploadFailed {
            name: "dog.png".to_string(),
            error: "offline".to_string(),
        });

        let events = bus.take_recorded();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], AppEvent::SavedLocally { name: "cat.png".to_string() });
        assert!(events[1].is_failure());
        assert!(bus.take_recorded().is_empty());
    }

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failures_are_logged_as_errors() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let bus = EventBus::new(true);
        tracing::subscriber::with_default(subscriber, || {
            bus.emit(AppEvent::SavedLocally { name: "cat.png".to_string() });
            bus.emit(AppEvent::RemoteDeleteFailed {
                name: "dog.png".to_string(),
                error: "offline".to_string(),
            });
        });

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("ERROR"));
        assert!(output.contains("dog.png"));
    }

    #[test]
    fn test_plain_bus_records_nothing() {
        let bus = EventBus::new(true);
        bus.emit(AppEvent::SignedOut);
        assert!(bus.take_recorded().is_empty());
    }
}
