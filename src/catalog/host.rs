//! Host messenger bridge (Telegram WebApp)
//!
//! When the page runs inside the messenger, links and sharing go through the
//! host; otherwise the browser fallbacks are used.

use serde::Deserialize;

/// Text attached to shared links
pub const SHARE_TEXT: &str =
    "🎮 Открой для себя Games Verse - все лучшие игры Telegram в одном приложении! Присоединяйся сейчас!";

const DEFAULT_NAME: &str = "Пользователь";

/// User payload provided by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Profile shown when running outside the host
    pub fn browser_default() -> Self {
        Self {
            first_name: Some(DEFAULT_NAME.to_string()),
            username: Some("user".to_string()),
            photo_url: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME)
    }

    /// `@username`, or the generic name when there is none
    pub fn handle(&self) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(u) => format!("@{}", u),
            None => DEFAULT_NAME.to_string(),
        }
    }
}

/// Operations the host exposes to the page
pub trait HostBridge {
    fn open_link(&self, url: &str);
    fn share_url(&self, url: &str, text: &str);
    fn expand(&self);
    fn ready(&self);
    fn enable_closing_confirmation(&self);
    fn user(&self) -> Option<UserProfile>;
}

/// How a game link is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchRoute {
    Host,
    /// `window.open(url, "_blank", "noopener,noreferrer")`
    NewTab,
}

/// How the app link is shared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRoute {
    Host,
    /// `navigator.share`
    NativeShare,
    /// Copy to clipboard and show a toast
    Clipboard,
}

pub fn launch_route(host: Option<&dyn HostBridge>) -> LaunchRoute {
    match host {
        Some(_) => LaunchRoute::Host,
        None => LaunchRoute::NewTab,
    }
}

pub fn share_route(host: Option<&dyn HostBridge>, native_share: bool) -> ShareRoute {
    match (host, native_share) {
        (Some(_), _) => ShareRoute::Host,
        (None, true) => ShareRoute::NativeShare,
        (None, false) => ShareRoute::Clipboard,
    }
}

/// Prepare the host: expand, confirm on close, signal ready.
/// Returns the profile to display.
pub fn init_host(host: Option<&dyn HostBridge>) -> UserProfile {
    match host {
        Some(host) => {
            host.expand();
            host.enable_closing_confirmation();
            let user = host.user().unwrap_or_default();
            host.ready();
            user
        }
        None => {
            log::info!("Host bridge not detected, running in browser mode");
            UserProfile::browser_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHost {
        calls: RefCell<Vec<String>>,
        user: Option<UserProfile>,
    }

    impl HostBridge for RecordingHost {
        fn open_link(&self, url: &str) {
            self.calls.borrow_mut().push(format!("open:{}", url));
        }
        fn share_url(&self, url: &str, _text: &str) {
            self.calls.borrow_mut().push(format!("share:{}", url));
        }
        fn expand(&self) {
            self.calls.borrow_mut().push("expand".into());
        }
        fn ready(&self) {
            self.calls.borrow_mut().push("ready".into());
        }
        fn enable_closing_confirmation(&self) {
            self.calls.borrow_mut().push("confirm".into());
        }
        fn user(&self) -> Option<UserProfile> {
            self.user.clone()
        }
    }

    #[test]
    fn test_routes() {
        let host = RecordingHost::default();
        assert_eq!(launch_route(Some(&host)), LaunchRoute::Host);
        assert_eq!(launch_route(None), LaunchRoute::NewTab);
        assert_eq!(share_route(Some(&host), false), ShareRoute::Host);
        assert_eq!(share_route(None, true), ShareRoute::NativeShare);
        assert_eq!(share_route(None, false), ShareRoute::Clipboard);
    }

    #[test]
    fn test_init_host_order() {
        let host = RecordingHost {
            user: Some(UserProfile {
                first_name: Some("Ada".into()),
                username: Some("ada".into()),
                photo_url: None,
            }),
            ..Default::default()
        };
        let user = init_host(Some(&host));
        assert_eq!(*host.calls.borrow(), vec!["expand", "confirm", "ready"]);
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.handle(), "@ada");
    }

    #[test]
    fn test_profile_fallbacks() {
        let user: UserProfile = serde_json::from_str(r#"{"first_name": ""}"#).unwrap();
        assert_eq!(user.display_name(), "Пользователь");
        assert_eq!(user.handle(), "Пользователь");

        let browser = init_host(None);
        assert_eq!(browser.handle(), "@user");
    }
}
