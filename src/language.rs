use std::str::FromStr;

/// Languages the app speaks. Arabic is the default, the same as the mobile app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

/// A value with one variant per supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localized<T> {
    pub en: T,
    pub ar: T,
}

impl<T> Localized<T> {
    pub const fn new(en: T, ar: T) -> Self {
        Self { en, ar }
    }

    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::En => &self.en,
            Language::Ar => &self.ar,
        }
    }
}

/// Static bilingual text, the shape every dataset in this crate uses.
pub type Text = Localized<&'static str>;

impl Text {
    pub fn pick(&self, language: Language) -> &'static str {
        *self.get(language)
    }

    /// True if `input` equals this text in either language.
    pub fn matches(&self, input: &str) -> bool {
        let input = input.trim();
        input == self.en || input == self.ar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert_eq!(" Arabic ".parse::<Language>(), Ok(Language::Ar));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn code_parses_back() {
        for language in [Language::En, Language::Ar] {
            assert_eq!(language.code().parse::<Language>(), Ok(language));
        }
        assert_eq!(Language::En.toggled(), Language::Ar);
    }

    #[test]
    fn text_matches_either_language() {
        let text = Text::new("Next", "التالي");
        assert!(text.matches("Next"));
        assert!(text.matches("التالي "));
        assert!(!text.matches("Previous"));
        assert_eq!(text.pick(Language::Ar), "التالي");
    }
}
