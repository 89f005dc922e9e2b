use crate::config::settings::{display_value, MenuKind};
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::Plugin;

/// What a single run produced: the markup and the process exit code.
#[derive(Debug)]
pub struct RunOutcome {
    pub menu: Menu,
    pub exit_code: i32,
}

pub struct PluginEngine<P: Plugin> {
    plugin: P,
    ctx: PluginContext,
}

impl<P: Plugin> PluginEngine<P> {
    pub fn new(plugin: P, ctx: PluginContext) -> Self {
        Self { plugin, ctx }
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    pub async fn run(&self) -> RunOutcome {
        tracing::debug!("Running plugin {} for {}", self.plugin.name(), self.ctx.host.invoker.name());
        let invoker = self.ctx.host.invoker.clone();

        let rendered = match self.plugin.collect(&self.ctx).await {
            Ok(data) => {
                let mut menu = Menu::new(invoker.clone());
                self.plugin.render(data, &self.ctx, &mut menu).map(|_| menu)
            }
            Err(e) => Err(e),
        };

        let (mut menu, exit_code) = match rendered {
            Ok(menu) => (menu, 0),
            Err(e) => {
                tracing::error!(
                    "❌ {} failed: {} (Severity: {:?})",
                    self.plugin.name(),
                    e,
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                let mut menu = Menu::new(invoker);
                menu.title(&self.plugin.failure_title(), Params::new());
                menu.separator();
                menu.text(&e.user_friendly_message());
                (menu, e.severity().exit_code())
            }
        };

        self.render_footer(&mut menu);
        RunOutcome { menu, exit_code }
    }

    fn render_footer(&self, menu: &mut Menu) {
        let settings = &self.ctx.settings;
        let plugin_path = self.ctx.plugin_path();
        let with_menus: Vec<_> = settings
            .definitions()
            .iter()
            .filter_map(|d| d.menu.as_ref().map(|m| (d, m)))
            .collect();

        if !with_menus.is_empty() {
            menu.separator();
            menu.text("Settings");
        }
        for (definition, setting_menu) in with_menus {
            let flag = format!("--{}", setting_menu.flag);
            let title = settings.fill(&setting_menu.title);
            match setting_menu.kind {
                MenuKind::Toggle => {
                    let action = if settings.get_bool(&definition.key) {
                        "Disable"
                    } else {
                        "Enable"
                    };
                    menu.item(
                        &format!("--{} {}", action, title),
                        Params::new()
                            .cmd([plugin_path.clone(), flag])
                            .refresh(true)
                            .terminal(false),
                    );
                }
                MenuKind::Choice => {
                    menu.text(&format!("--{}", title));
                    let current = settings.get(&definition.key);
                    for choice in &setting_menu.choices {
                        let value = display_value(Some(choice));
                        let color = if current == Some(choice) { "blue" } else { "black" };
                        menu.item(
                            &format!("----{}", value),
                            Params::new()
                                .cmd([plugin_path.clone(), flag.clone(), value.clone()])
                                .color(color)
                                .refresh(true)
                                .terminal(false),
                        );
                    }
                }
            }
        }

        if let Some(key) = self.plugin.debug_setting() {
            if settings.get_bool(key) {
                menu.debug_section(&self.ctx.host, settings, self.ctx.runner());
            }
        }
        menu.item("Refresh", Params::new().refresh(true));
    }
}
