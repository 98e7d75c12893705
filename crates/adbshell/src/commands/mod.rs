//! Command dispatch: classified line -> handler -> console output.

pub mod apps;
pub mod config_cmd;
pub mod devices;
pub mod util;

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use tracing::warn;

use adbshell_core::{CountChange, FlagKey, Invocation, ShellCommand};

use crate::error::CliError;
use crate::output;
use crate::shell::ShellContext;

use self::util::Prompter;

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Execute one classified command.
pub async fn dispatch(
    ctx: &mut ShellContext,
    command: ShellCommand,
    prompter: &dyn Prompter,
) -> Result<Flow, CliError> {
    match command {
        ShellCommand::Empty => {}
        ShellCommand::Exit => {
            exit(ctx, prompter).await;
            return Ok(Flow::Exit);
        }
        ShellCommand::Config => config_cmd::handle(ctx).await?,
        ShellCommand::About => about(ctx),
        ShellCommand::Help => {
            output::print_output(&output::help_text(ctx.dispatcher.wsa_port()));
        }
        ShellCommand::Clear => clear_screen()?,
        ShellCommand::SaveDevice {
            name,
            address,
            autoconnect,
        } => devices::save(ctx, name, address, autoconnect)?,
        ShellCommand::RemoveSaved { name } => devices::remove(ctx, &name)?,
        ShellCommand::ConnectSaved { name } => devices::connect_saved(ctx, &name, true).await,
        ShellCommand::DisconnectSaved { name } => {
            devices::connect_saved(ctx, &name, false).await;
        }
        ShellCommand::ListSaved => devices::list(ctx),
        ShellCommand::ClearSaved => devices::clear(ctx, prompter)?,
        ShellCommand::SetAutoconnect { name, enabled } => {
            devices::set_autoconnect(ctx, &name, enabled)?;
        }
        ShellCommand::InstallApps => apps::install_all(ctx).await?,
        ShellCommand::Usage(message) => output::error_line(message, ctx.color),
        other => {
            if let Some(invocation) = other.direct_invocation() {
                ctx.run_tracked(&invocation, other.count_change()).await;
            }
        }
    }
    Ok(Flow::Continue)
}

/// Leaves the loop even when the question cannot be asked; a failed
/// prompt counts as no.
async fn exit(ctx: &ShellContext, prompter: &dyn Prompter) {
    let disconnect = prompter
        .confirm("Would you like to disconnect from all devices before exiting?")
        .unwrap_or_else(|e| {
            warn!(error = %e, "exit prompt failed");
            output::error_line(e, ctx.color);
            false
        });
    if disconnect {
        ctx.run_tracked(
            &Invocation::tool(["disconnect"]),
            Some(CountChange::DisconnectedAll),
        )
        .await;
    }
    println!("Exiting adb shell.");
}

fn about(ctx: &ShellContext) {
    let on_off = |key: FlagKey| if ctx.flags.get(key) { "on" } else { "off" };
    let text = format!(
        "adbshell v{version}\n\
         Home:              {home}\n\
         Config file:       {config}\n\
         adb:               {adb}\n\
         Connected devices: {connected}\n\
         Saved devices:     {saved}\n\
         Custom commands:   {custom}\n\
         Presence:          {presence}\n\
         Mods:              {mods}",
        version = env!("CARGO_PKG_VERSION"),
        home = ctx.paths.home().display(),
        config = ctx.config_file.display(),
        adb = ctx.adb.display(),
        connected = ctx.count.get(),
        saved = ctx.registry.len(),
        custom = on_off(FlagKey::CustomCommands),
        presence = on_off(FlagKey::PresenceReporting),
        mods = on_off(FlagKey::Mods),
    );
    output::print_output(&text);
}

fn clear_screen() -> Result<(), CliError> {
    execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use futures_util::future::BoxFuture;
    use pretty_assertions::assert_eq;

    use adbshell_config::AppPaths;
    use adbshell_core::{
        CommandRunner, ConfigFlags, CoreError, DeviceRegistry, Dispatcher, RunOutcome,
        SavedDevice,
    };

    use super::*;

    /// Records every invocation and reports a fixed outcome.
    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<Invocation>>,
        fail: bool,
    }

    impl RecordingRunner {
        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, RunOutcome> {
            self.calls.lock().unwrap().push(invocation.clone());
            let success = !self.fail;
            Box::pin(async move {
                RunOutcome {
                    success,
                    exit_code: Some(0),
                }
            })
        }

        fn capture<'a>(
            &'a self,
            _invocation: &'a Invocation,
        ) -> BoxFuture<'a, Result<String, CoreError>> {
            Box::pin(async { Ok("List of devices attached\n".to_owned()) })
        }
    }

    struct Answer(bool);

    impl Prompter for Answer {
        fn confirm(&self, _message: &str) -> Result<bool, CliError> {
            Ok(self.0)
        }
    }

    struct BrokenPrompt;

    impl Prompter for BrokenPrompt {
        fn confirm(&self, _message: &str) -> Result<bool, CliError> {
            Err(util::prompt_err("not a terminal"))
        }
    }

    struct Fixture {
        _home: tempfile::TempDir,
        runner: Arc<RecordingRunner>,
        ctx: ShellContext,
    }

    fn fixture_with(runner: RecordingRunner, flags: ConfigFlags) -> Fixture {
        let home = tempfile::tempdir().unwrap();
        let runner = Arc::new(runner);
        let ctx = ShellContext::new(
            AppPaths::new(home.path()),
            PathBuf::from("adb"),
            runner.clone(),
            flags,
            DeviceRegistry::new(),
            Dispatcher::default(),
        );
        Fixture {
            _home: home,
            runner,
            ctx,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingRunner::default(), ConfigFlags::default())
    }

    async fn type_line(f: &mut Fixture, line: &str, prompter: &dyn Prompter) -> Flow {
        let command = f.ctx.dispatcher.classify(line, &f.ctx.flags);
        dispatch(&mut f.ctx, command, prompter).await.unwrap()
    }

    async fn enter(f: &mut Fixture, line: &str) -> Flow {
        type_line(f, line, &Answer(false)).await
    }

    #[tokio::test]
    async fn save_then_connectsaved_connects_to_saved_address() {
        let mut f = fixture();

        enter(&mut f, "save 127.0.0.1:5555 --name phone").await;
        enter(&mut f, "connectsaved phone").await;

        assert_eq!(
            f.runner.calls(),
            vec![Invocation::tool(["connect", "127.0.0.1:5555"])]
        );
        assert_eq!(f.ctx.count.get(), 1);
    }

    #[tokio::test]
    async fn save_persists_to_config_file() {
        let mut f = fixture();

        enter(&mut f, "save 10.0.0.5:5555 --name lab tablet --autoconnect").await;

        let doc = adbshell_config::load(&f.ctx.config_file).unwrap();
        assert_eq!(
            doc.devices,
            vec![SavedDevice::new("lab tablet", "10.0.0.5:5555", true)]
        );
    }

    #[tokio::test]
    async fn removesaved_matches_whole_names_only() {
        let mut f = fixture();
        enter(&mut f, "save 10.0.0.1:5555 --name foo").await;
        enter(&mut f, "save 10.0.0.2:5555 --name foobar").await;

        enter(&mut f, "removesaved foo").await;

        let names: Vec<_> = f.ctx.registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["foobar"]);
        let doc = adbshell_config::load(&f.ctx.config_file).unwrap();
        assert_eq!(doc.devices.len(), 1);
    }

    #[tokio::test]
    async fn connectsaved_unknown_name_runs_nothing() {
        let mut f = fixture();
        enter(&mut f, "connectsaved ghost").await;
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn adb_prefixed_connect_moves_the_count() {
        let mut f = fixture();

        enter(&mut f, "adb connect 1.2.3.4:5555").await;
        enter(&mut f, "connect 5.6.7.8:5555").await;
        assert_eq!(f.ctx.count.get(), 2);

        enter(&mut f, "disconnect 1.2.3.4:5555").await;
        assert_eq!(f.ctx.count.get(), 1);

        enter(&mut f, "disconnect").await;
        assert_eq!(f.ctx.count.get(), 0);
        assert_eq!(
            f.runner.calls().first(),
            Some(&Invocation::tool(["connect", "1.2.3.4:5555"]))
        );
    }

    #[tokio::test]
    async fn failed_connect_leaves_count_alone() {
        let mut f = fixture_with(
            RecordingRunner {
                fail: true,
                ..RecordingRunner::default()
            },
            ConfigFlags::default(),
        );
        enter(&mut f, "wsaconnect").await;
        assert_eq!(f.ctx.count.get(), 0);
        assert_eq!(
            f.runner.calls(),
            vec![Invocation::tool(["connect", "localhost:58526"])]
        );
    }

    #[tokio::test]
    async fn disconnect_never_drives_count_negative() {
        let mut f = fixture();
        enter(&mut f, "localdisconnect 5555").await;
        enter(&mut f, "disconnectsaved nothing").await;
        assert_eq!(f.ctx.count.get(), 0);
    }

    #[tokio::test]
    async fn exit_disconnects_only_when_confirmed() {
        let mut f = fixture();
        assert_eq!(enter(&mut f, "exit").await, Flow::Exit);
        assert!(f.runner.calls().is_empty());

        assert_eq!(type_line(&mut f, "EXIT", &Answer(true)).await, Flow::Exit);
        assert_eq!(f.runner.calls(), vec![Invocation::tool(["disconnect"])]);
    }

    #[tokio::test]
    async fn exit_still_exits_when_the_prompt_fails() {
        let mut f = fixture();
        assert_eq!(type_line(&mut f, "exit", &BrokenPrompt).await, Flow::Exit);
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn exit_works_with_custom_commands_off() {
        let mut flags = ConfigFlags::default();
        flags.set(FlagKey::CustomCommands, false);
        let mut f = fixture_with(RecordingRunner::default(), flags);

        assert_eq!(enter(&mut f, "exit").await, Flow::Exit);
        assert_eq!(enter(&mut f, "help").await, Flow::Continue);
        assert_eq!(f.runner.calls(), vec![Invocation::tool(["help"])]);
    }

    #[tokio::test]
    async fn clearsaved_requires_confirmation() {
        let mut f = fixture();
        enter(&mut f, "save 10.0.0.1:5555 --name a").await;
        enter(&mut f, "save 10.0.0.2:5555 --name b").await;

        enter(&mut f, "clearsaved").await;
        assert_eq!(f.ctx.registry.len(), 2);

        type_line(&mut f, "clearsaved", &Answer(true)).await;
        assert!(f.ctx.registry.is_empty());
        assert!(adbshell_config::load(&f.ctx.config_file).unwrap().devices.is_empty());
    }

    #[tokio::test]
    async fn autoconnect_toggle_is_persisted() {
        let mut f = fixture();
        enter(&mut f, "save 10.0.0.1:5555 --name tv").await;
        enter(&mut f, "autoconnect tv on").await;

        assert!(f.ctx.registry.find_by_name("tv").unwrap().autoconnect);
        let doc = adbshell_config::load(&f.ctx.config_file).unwrap();
        assert!(doc.devices[0].autoconnect);
    }

    #[tokio::test]
    async fn startup_autoconnect_connects_flagged_devices_in_order() {
        let mut f = fixture();
        f.ctx.registry.add("a", "10.0.0.1:5555", true);
        f.ctx.registry.add("b", "10.0.0.2:5555", false);
        f.ctx.registry.add("c", "10.0.0.3:5555", true);

        crate::shell::autoconnect(&f.ctx).await;

        assert_eq!(
            f.runner.calls(),
            vec![
                Invocation::tool(["connect", "10.0.0.1:5555"]),
                Invocation::tool(["connect", "10.0.0.3:5555"]),
            ]
        );
        assert_eq!(f.ctx.count.get(), 2);
    }

    #[tokio::test]
    async fn failed_save_leaves_registry_untouched() {
        let mut f = fixture();
        // A directory where the config file should be makes the rename fail.
        std::fs::create_dir_all(&f.ctx.config_file).unwrap();

        let command = f
            .ctx
            .dispatcher
            .classify("save 10.0.0.1:5555 --name phone", &f.ctx.flags);
        let result = dispatch(&mut f.ctx, command, &Answer(false)).await;

        assert!(result.is_err());
        assert!(f.ctx.registry.is_empty());
    }

    #[tokio::test]
    async fn usage_errors_do_not_run_anything() {
        let mut f = fixture();
        enter(&mut f, "apppath").await;
        enter(&mut f, "localconnect abc").await;
        enter(&mut f, "save 10.0.0.1:5555").await;
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn installapp_without_apks_runs_nothing() {
        let mut f = fixture();
        enter(&mut f, "installapp").await;
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn installapp_installs_apks_from_home() {
        let mut f = fixture();
        let apks = f.ctx.paths.apks_dir();
        std::fs::create_dir_all(&apks).unwrap();
        std::fs::write(apks.join("app.apk"), "").unwrap();

        enter(&mut f, "installapp").await;

        assert_eq!(
            f.runner.calls(),
            vec![Invocation::tool([
                "install".to_owned(),
                apks.join("app.apk").display().to_string()
            ])]
        );
    }

    #[tokio::test]
    async fn passthrough_and_fallback_reach_the_runner() {
        let mut f = fixture();
        enter(&mut f, "shell getprop ro.product.model").await;
        enter(&mut f, "shpm list packages -3").await;
        assert_eq!(
            f.runner.calls(),
            vec![
                Invocation::tool(["shell", "getprop", "ro.product.model"]),
                Invocation::tool(["shell", "pm", "list", "packages", "-3"]),
            ]
        );
    }
}
