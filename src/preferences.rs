//! Display preferences
//!
//! Colour theme and the active surface, each persisted as raw text in its
//! own slot.

use crate::error::{Result, StoryWeaverError};
use crate::storage::{keys, SlotStore};
use std::fmt;
use std::str::FromStr;

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light background
    Light,
    /// Dark background
    #[default]
    Dark,
}

impl Theme {
    /// Lowercase slot value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Guess the terminal theme from a `COLORFGBG` value (`fg;bg`)
    ///
    /// Background colours 7 and 15 are light; anything else, including an
    /// unset or unparsable value, is dark.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::preferences::Theme;
    ///
    /// assert_eq!(Theme::from_colorfgbg(Some("0;15")), Theme::Light);
    /// assert_eq!(Theme::from_colorfgbg(Some("15;0")), Theme::Dark);
    /// assert_eq!(Theme::from_colorfgbg(None), Theme::Dark);
    /// ```
    pub fn from_colorfgbg(value: Option<&str>) -> Self {
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());
        match background {
            Some(7) | Some(15) => Self::Light,
            _ => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = StoryWeaverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(StoryWeaverError::InvalidMode(format!(
                "Unknown theme: {}",
                other
            ))),
        }
    }
}

/// Active surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Story-finding chat
    #[default]
    Library,
    /// Treatise editor and consultation chat
    Scriptorium,
}

impl ViewMode {
    /// Lowercase slot value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Scriptorium => "scriptorium",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = StoryWeaverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "library" => Ok(Self::Library),
            "scriptorium" => Ok(Self::Scriptorium),
            other => Err(StoryWeaverError::InvalidMode(format!(
                "Unknown view mode: {}",
                other
            ))),
        }
    }
}

/// Persisted theme and view mode
pub struct Preferences {
    store: SlotStore,
}

impl Preferences {
    /// Create a preferences handle over a slot store
    pub fn new(store: SlotStore) -> Self {
        Self { store }
    }

    /// Current theme
    ///
    /// A valid persisted value wins; otherwise the terminal's `COLORFGBG`
    /// decides, and without it the theme is dark.
    pub fn theme(&self) -> Theme {
        self.theme_with_env(std::env::var("COLORFGBG").ok().as_deref())
    }

    fn theme_with_env(&self, colorfgbg: Option<&str>) -> Theme {
        if let Some(theme) = self.read_slot::<Theme>(keys::THEME) {
            return theme;
        }
        let theme = Theme::from_colorfgbg(colorfgbg);
        tracing::debug!("No saved theme, using {}", theme);
        theme
    }

    /// Persist a theme
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.write(keys::THEME, theme.as_str())?;
        tracing::info!("Theme set to {}", theme);
        Ok(())
    }

    /// Switch between light and dark, returning the new theme
    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Current view mode; library unless a valid value was saved
    pub fn view_mode(&self) -> ViewMode {
        self.read_slot::<ViewMode>(keys::VIEW_MODE)
            .unwrap_or_default()
    }

    /// Persist a view mode
    pub fn set_view_mode(&self, mode: ViewMode) -> Result<()> {
        self.store.write(keys::VIEW_MODE, mode.as_str())?;
        tracing::info!("View mode set to {}", mode);
        Ok(())
    }

    fn read_slot<T: FromStr>(&self, key: &str) -> Option<T> {
        match self.store.read(key) {
            Ok(Some(raw)) => match raw.parse::<T>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid value {:?} in slot {}", raw, key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read slot {}: {}", key, e);
                None
            }
        }
    }
}
