use std::fmt;

/// Системная настройка оформления (org.gnome.desktop.interface color-scheme)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppearanceMode {
    Default,
    PreferDark,
}

impl AppearanceMode {
    /// Разобрать строку вывода `gsettings monitor`.
    ///
    /// Принимаются только строки вида `color-scheme: '<value>'`, всё остальное
    /// возвращает `None` и должно быть проигнорировано вызывающей стороной.
    pub fn from_monitor_line(line: &str) -> Option<Self> {
        match line {
            "color-scheme: 'default'" => Some(AppearanceMode::Default),
            "color-scheme: 'prefer-dark'" => Some(AppearanceMode::PreferDark),
            _ => None,
        }
    }

    /// Индекс в паре тем: 0 для светлой, 1 для темной
    pub fn index(self) -> usize {
        match self {
            AppearanceMode::Default => 0,
            AppearanceMode::PreferDark => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppearanceMode::Default => "default",
            AppearanceMode::PreferDark => "prefer-dark",
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Пара тем, применяемая за одно событие
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePair {
    pub terminal: String,
    pub editor: String,
}

impl fmt::Display for ThemePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminal={}, editor={}", self.terminal, self.editor)
    }
}

/// Неизменяемая таблица тем: ровно по две на приложение, порядок [светлая, темная]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeTable {
    terminal: [String; 2],
    editor: [String; 2],
}

impl ThemeTable {
    pub fn new(terminal: &[String], editor: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            terminal: Self::exactly_two("terminal", terminal)?,
            editor: Self::exactly_two("editor", editor)?,
        })
    }

    fn exactly_two(target: &str, themes: &[String]) -> anyhow::Result<[String; 2]> {
        match themes {
            [light, dark] => Ok([light.clone(), dark.clone()]),
            _ => anyhow::bail!(
                "Нужно ровно 2 темы для {} (светлая и темная), получено {}",
                target,
                themes.len()
            ),
        }
    }

    pub fn resolve(&self, mode: AppearanceMode) -> ThemePair {
        let i = mode.index();
        ThemePair {
            terminal: self.terminal[i].clone(),
            editor: self.editor[i].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_monitor_line_parsing() {
        assert_eq!(
            AppearanceMode::from_monitor_line("color-scheme: 'prefer-dark'"),
            Some(AppearanceMode::PreferDark)
        );
        assert_eq!(
            AppearanceMode::from_monitor_line("color-scheme: 'default'"),
            Some(AppearanceMode::Default)
        );
    }

    #[test]
    fn test_monitor_line_rejects_other_output() {
        for line in [
            "",
            "color-scheme: 'prefer-light'",
            "color-scheme: default",
            " color-scheme: 'default'",
            "color-scheme: 'default' ",
            "gtk-theme: 'Adwaita'",
        ] {
            assert_eq!(AppearanceMode::from_monitor_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_mode_index_and_display() {
        assert_eq!(AppearanceMode::Default.index(), 0);
        assert_eq!(AppearanceMode::PreferDark.index(), 1);
        assert_eq!(AppearanceMode::PreferDark.to_string(), "prefer-dark");
    }

    #[test]
    fn test_theme_table_resolve() {
        let table = ThemeTable::new(
            &names(&["Catppuccin-Latte", "Catppuccin-Mocha"]),
            &names(&["catppuccin_latte", "catppuccin_macchiato"]),
        )
        .unwrap();

        assert_eq!(
            table.resolve(AppearanceMode::Default),
            ThemePair {
                terminal: "Catppuccin-Latte".to_string(),
                editor: "catppuccin_latte".to_string(),
            }
        );
        assert_eq!(
            table.resolve(AppearanceMode::PreferDark),
            ThemePair {
                terminal: "Catppuccin-Mocha".to_string(),
                editor: "catppuccin_macchiato".to_string(),
            }
        );
    }

    #[test]
    fn test_theme_table_requires_two_entries() {
        let two = names(&["a", "b"]);
        assert!(ThemeTable::new(&names(&["a"]), &two).is_err());
        assert!(ThemeTable::new(&two, &names(&["a", "b", "c"])).is_err());
        assert!(ThemeTable::new(&[], &two).is_err());
    }
}
