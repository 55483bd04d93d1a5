//! Per-window key handlers and the global keys.

use anyhow::Result;

use crate::{
    events::Window,
    host::Host,
    keys, readiness, screens,
    view::{ButtonId, Dialog, Item, View},
};

use super::{App, ExitRequest, Origin, actions};

/// What a dialog made of a key.
#[derive(Debug, PartialEq, Eq)]
pub enum DialogKey {
    /// Editing or focus movement.
    Consumed,
    /// `enter` on a button, or on an edit field (`None`, the default action).
    Activate(Option<ButtonId>),
    /// A radio option was checked.
    Checked(String),
    Esc,
    Unhandled,
}

/// Shared key handling of every dialog: editing, focus and activation.
pub fn dialog_key(d: &mut Dialog, key: &str) -> DialogKey {
    match key {
        "esc" => return DialogKey::Esc,
        "enter" => {
            return match d.focused() {
                Some(Item::Button(id, _)) => DialogKey::Activate(Some(*id)),
                Some(Item::Radio(_)) => match d.check_focused_radio() {
                    Some(v) => DialogKey::Checked(v),
                    None => DialogKey::Consumed,
                },
                _ => DialogKey::Activate(None),
            };
        }
        "space" if matches!(d.focused(), Some(Item::Radio(_))) => {
            return match d.check_focused_radio() {
                Some(v) => DialogKey::Checked(v),
                None => DialogKey::Consumed,
            };
        }
        _ => {}
    }
    // Left/right move the cursor and only reach focus at the field's ends.
    if d.edit(key) {
        return DialogKey::Consumed;
    }
    if let Some(dir) = keys::tab_direction(key) {
        d.tab(dir);
        return DialogKey::Consumed;
    }
    DialogKey::Unhandled
}

/// Route a key to the handler of the current window. Returns whether the key
/// was used; unused user keys go on to the global keys.
pub async fn handle_window<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    key: &str,
    origin: Origin,
) -> Result<bool> {
    let window = app.window();
    if origin == Origin::Replay
        && !matches!(
            window,
            Window::Reboot | Window::Shutdown | Window::KeyboardSwitch
        )
    {
        // Windows without deferred actions swallow replays.
        return Ok(true);
    }
    match window {
        Window::Main => Ok(handle_main(app, key)),
        Window::Login => handle_login(app, host, key).await,
        Window::MainMenu => handle_menu(app, host, key).await,
        Window::MessageBox => Ok(handle_message(app, key)),
        Window::InputBox => Ok(handle_input(app, key)),
        Window::Password | Window::AdminWebPw => handle_password(app, host, key).await,
        Window::Timesyncd => handle_timesyncd(app, host, key).await,
        Window::RepoSelection => handle_repo(app, host, key).await,
        Window::KeyboardSwitch => handle_keyboard(app, host, key, origin).await,
        Window::LogViewer | Window::Unsupported => handle_logs(app, host, key).await,
        Window::Reboot | Window::Shutdown => Ok(handle_power(app, origin)),
        Window::Terminal => Ok(false),
    }
}

fn handle_main(app: &mut App, key: &str) -> bool {
    match key {
        "f2" => {
            if readiness::root_login_optional(&app.cfg.paths.shadow) {
                tracing::info!("root has no password, opening the menu without login");
                actions::grant_session(app);
                app.open_main_menu();
            } else {
                app.view = View::Login(screens::login_dialog(&app.tr, "root"));
            }
        }
        "tab" => {
            if let View::Main(m) = &mut app.view {
                m.toggle_focus();
            }
        }
        "l" if app.opts.hidden_login => {
            tracing::info!("development mode: menu opened without login");
            app.open_main_menu();
        }
        _ => return false,
    }
    true
}

async fn handle_login<H: Host + ?Sized>(app: &mut App, host: &mut H, key: &str) -> Result<bool> {
    let View::Login(d) = &mut app.view else {
        return Ok(false);
    };
    match dialog_key(d, key) {
        DialogKey::Esc => app.open_main(host).await,
        DialogKey::Activate(_) => actions::login(app, host).await?,
        DialogKey::Consumed | DialogKey::Checked(_) => {}
        DialogKey::Unhandled => return Ok(false),
    }
    Ok(true)
}

async fn handle_menu<H: Host + ?Sized>(app: &mut App, host: &mut H, key: &str) -> Result<bool> {
    let View::MainMenu(menu) = &mut app.view else {
        return Ok(false);
    };
    let activate = match key {
        "up" | "shift tab" => {
            menu.up();
            false
        }
        "down" | "tab" => {
            menu.down();
            false
        }
        "enter" => true,
        _ => match key.parse::<usize>() {
            Ok(n @ 1..=9) => menu.select(n),
            _ => return Ok(false),
        },
    };
    app.menu_focus = menu.focus;
    if activate && let Some(action) = menu.activate() {
        tracing::info!("menu action {action:?}");
        actions::run_menu_action(app, host, action).await?;
    }
    Ok(true)
}

fn handle_message(app: &mut App, key: &str) -> bool {
    let View::Message(d) = &mut app.view else {
        return false;
    };
    if key.ends_with("enter") {
        app.last_button = d.focused_button();
    } else if key == "esc" {
        app.last_button = None;
    } else if let Some(dir) = keys::tab_direction(key) {
        d.tab(dir);
        return true;
    } else {
        return false;
    }
    app.close_modal(key);
    true
}

fn handle_input(app: &mut App, key: &str) -> bool {
    let View::Input(d) = &mut app.view else {
        return false;
    };
    match dialog_key(d, key) {
        DialogKey::Esc | DialogKey::Activate(Some(ButtonId::Cancel)) => {
            app.last_input.clear();
            app.last_button = Some(ButtonId::Cancel);
        }
        DialogKey::Activate(_) => {
            app.last_input = d.value(crate::view::FieldId::Input);
            app.last_button = Some(ButtonId::Ok);
        }
        DialogKey::Consumed | DialogKey::Checked(_) => return true,
        DialogKey::Unhandled => return false,
    }
    app.close_modal(key);
    true
}

async fn handle_password<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    key: &str,
) -> Result<bool> {
    let View::Password { dialog, .. } = &mut app.view else {
        return Ok(false);
    };
    match dialog_key(dialog, key) {
        DialogKey::Esc | DialogKey::Activate(Some(ButtonId::Cancel)) => {
            actions::abort_password(app)
        }
        DialogKey::Activate(_) => actions::submit_password(app, host).await?,
        DialogKey::Consumed | DialogKey::Checked(_) => {}
        DialogKey::Unhandled => return Ok(false),
    }
    Ok(true)
}

async fn handle_timesyncd<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    key: &str,
) -> Result<bool> {
    let View::Timesyncd(d) = &mut app.view else {
        return Ok(false);
    };
    match dialog_key(d, key) {
        DialogKey::Esc | DialogKey::Activate(Some(ButtonId::Cancel)) => app.open_main_menu(),
        DialogKey::Activate(_) => actions::save_timesyncd(app, host).await?,
        DialogKey::Consumed | DialogKey::Checked(_) => {}
        DialogKey::Unhandled => return Ok(false),
    }
    Ok(true)
}

async fn handle_repo<H: Host + ?Sized>(app: &mut App, host: &mut H, key: &str) -> Result<bool> {
    let View::Repo(d) = &mut app.view else {
        return Ok(false);
    };
    match dialog_key(d, key) {
        DialogKey::Esc | DialogKey::Activate(Some(ButtonId::Cancel)) => app.open_main_menu(),
        DialogKey::Activate(_) => actions::save_repo(app, host).await?,
        DialogKey::Consumed | DialogKey::Checked(_) => {}
        DialogKey::Unhandled => return Ok(false),
    }
    Ok(true)
}

async fn handle_keyboard<H: Host + ?Sized>(
    app: &mut App,
    host: &mut H,
    key: &str,
    origin: Origin,
) -> Result<bool> {
    if origin == Origin::Replay {
        // Back from the free-form prompt.
        let typed = std::mem::take(&mut app.last_input);
        if key == "enter" && !typed.trim().is_empty() {
            actions::apply_keymap(app, host, typed.trim()).await?;
        }
        return Ok(true);
    }
    let View::Keyboard(d) = &mut app.view else {
        return Ok(false);
    };
    match dialog_key(d, key) {
        DialogKey::Esc | DialogKey::Activate(Some(ButtonId::Cancel)) => {
            actions::leave_overlay(app, host).await
        }
        DialogKey::Checked(keymap) => actions::apply_keymap(app, host, &keymap).await?,
        DialogKey::Activate(Some(ButtonId::Other)) => actions::ask_keymap(app),
        DialogKey::Activate(_) | DialogKey::Consumed => {}
        DialogKey::Unhandled => return Ok(false),
    }
    Ok(true)
}

async fn handle_logs<H: Host + ?Sized>(app: &mut App, host: &mut H, key: &str) -> Result<bool> {
    match key {
        "esc" | "h" | "l" | "ctrl f1" => actions::leave_overlay(app, host).await,
        "left" => actions::switch_unit(app, host, -1).await,
        "right" => actions::switch_unit(app, host, 1).await,
        "+" => actions::adjust_lines(app, host, true).await,
        "-" => actions::adjust_lines(app, host, false).await,
        "up" | "down" | "page up" | "page down" => {
            if let View::Logs(l) = &mut app.view {
                match key {
                    "up" => l.scroll_up(1),
                    "down" => l.scroll_down(1),
                    "page up" => l.scroll_up(20),
                    _ => l.scroll_down(20),
                }
            }
        }
        _ => {
            if let Some(c) = keys::printable(key) {
                // Other globals still see the letter unless it completed the word.
                return actions::feed_escape(app, host, c).await;
            }
            return Ok(false);
        }
    }
    Ok(true)
}

fn handle_power(app: &mut App, origin: Origin) -> bool {
    if origin != Origin::Replay {
        return false;
    }
    let View::Power(action) = app.view else {
        return false;
    };
    if app.last_button == Some(ButtonId::Ok) {
        tracing::info!("{} confirmed", action.command());
        app.exit = Some(ExitRequest::Exec(vec![action.command().to_string()]));
    } else {
        app.open_main_menu();
    }
    true
}

/// Keys that work everywhere unless the window used them.
pub async fn handle_global<H: Host + ?Sized>(app: &mut App, host: &mut H, key: &str) -> Result<()> {
    let window = app.window();
    // Window changes are off while a modal, a subprocess or a power
    // confirmation owns the screen.
    let settled = app.modal.is_none()
        && !matches!(
            window,
            Window::Terminal | Window::Reboot | Window::Shutdown
        );
    let in_logs = matches!(window, Window::LogViewer | Window::Unsupported);
    match key {
        "f10" | "Q" => {
            tracing::info!("exit requested");
            app.exit = Some(ExitRequest::Quit);
        }
        "f1" | "c" => {
            app.scheme = app.scheme.next();
            tracing::debug!("color scheme {}", app.scheme.name());
        }
        "f4" if settled && app.session.authenticated => app.open_main_menu(),
        "f5" if settled && !in_logs && window != Window::KeyboardSwitch => {
            actions::open_keyboard(app)
        }
        "ctrl f1" | "h" | "l" if settled && !in_logs && window != Window::KeyboardSwitch => {
            actions::open_logs(app, host).await
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{input::EditField, view::FieldId};

    fn form() -> Dialog {
        Dialog::new(
            "f",
            vec![Item::Edit(FieldId::Ntp, EditField::new("NTP", "ab"))],
            vec![
                Item::Button(ButtonId::Ok, "OK".into()),
                Item::Button(ButtonId::Cancel, "Cancel".into()),
            ],
        )
    }

    #[test]
    fn arrows_edit_until_the_field_end() {
        let mut d = form();
        assert_eq!(dialog_key(&mut d, "left"), DialogKey::Consumed);
        assert_eq!(d.field(FieldId::Ntp).unwrap().cursor, 1);
        assert_eq!(dialog_key(&mut d, "right"), DialogKey::Consumed);
        // Cursor at the end: right moves focus to the buttons.
        assert_eq!(dialog_key(&mut d, "right"), DialogKey::Consumed);
        assert_eq!(d.focused_button(), Some(ButtonId::Ok));
    }

    #[test]
    fn enter_in_a_field_is_the_default_action() {
        let mut d = form();
        assert_eq!(dialog_key(&mut d, "enter"), DialogKey::Activate(None));
        d.focus_button(ButtonId::Cancel);
        assert_eq!(
            dialog_key(&mut d, "enter"),
            DialogKey::Activate(Some(ButtonId::Cancel))
        );
    }

    #[test]
    fn letters_type_into_fields_but_not_buttons() {
        let mut d = form();
        assert_eq!(dialog_key(&mut d, "c"), DialogKey::Consumed);
        assert_eq!(d.value(FieldId::Ntp), "abc");
        d.focus_button(ButtonId::Ok);
        assert_eq!(dialog_key(&mut d, "c"), DialogKey::Unhandled);
        assert_eq!(dialog_key(&mut d, "esc"), DialogKey::Esc);
    }
}
