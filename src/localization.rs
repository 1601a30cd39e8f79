use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Languages the storefront ships translations for
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "he"];

/// Fallback language when the user's preference is unavailable
pub const DEFAULT_LANGUAGE: &str = "en";

/// Localization manager for the Samna Salta bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl std::fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationManager")
            .field("languages", &self.available_languages())
            .finish()
    }
}

impl LocalizationManager {
    /// Create a new localization manager
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for locale_str in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = locale_str
                .parse()
                .with_context(|| format!("Invalid locale identifier: {}", locale_str))?;
            let bundle = Self::create_bundle(&locale)?;
            bundles.insert(locale_str.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        // The concurrent bundle is shareable across handler tasks
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);

        // Load the main resource file - path relative to Cargo.toml
        let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        let resource_path = format!("{}/locales/{}/main.ftl", manifest_dir, locale);
        match fs::read_to_string(&resource_path) {
            Ok(content) => {
                if let Ok(resource) = FluentResource::try_new(content) {
                    let _ = bundle.add_resource(resource);
                }
            }
            Err(err) => {
                tracing::warn!(
                    locale = %locale,
                    path = %resource_path,
                    error = %err,
                    "Could not read locale resource file"
                );
            }
        }

        Ok(bundle)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self.bundles.get(language) {
            Some(bundle) => bundle,
            None => {
                // Fallback to English if language not found
                match self.bundles.get(DEFAULT_LANGUAGE) {
                    Some(bundle) => bundle,
                    None => return format!("Missing translation: {}", key),
                }
            }
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => {
                // A key missing from a translation falls back to English too
                if language != DEFAULT_LANGUAGE {
                    if let Some(en_bundle) = self.bundles.get(DEFAULT_LANGUAGE) {
                        if let Some(en_msg) = en_bundle.get_message(key) {
                            return Self::format_message(en_bundle, key, &en_msg, args);
                        }
                    }
                }
                return format!("Missing translation: {}", key);
            }
        };

        Self::format_message(bundle, key, &msg, args)
    }

    fn format_message(
        bundle: &FluentBundle<FluentResource>,
        key: &str,
        msg: &fluent_bundle::FluentMessage,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut value = String::new();

        if let Some(args) = args {
            let fluent_args = fluent_bundle::FluentArgs::from_iter(
                args.iter()
                    .map(|(k, v)| (*k, fluent_bundle::FluentValue::from(*v))),
            );

            let _ = bundle.write_pattern(&mut value, pattern, Some(&fluent_args), &mut vec![]);
        } else {
            let _ = bundle.write_pattern(&mut value, pattern, None, &mut vec![]);
        }

        value
    }

    /// Get a localized message with arguments in a specific language
    pub fn get_message_with_args_in_language(
        &self,
        key: &str,
        language: &str,
        args: &[(&str, &str)],
    ) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// List the languages with loaded bundles
    pub fn available_languages(&self) -> Vec<&str> {
        self.bundles.keys().map(|s| s.as_str()).collect()
    }
}

/// Create a shared localization manager for use across handlers
pub fn create_localization_manager() -> Result<Arc<LocalizationManager>> {
    Ok(Arc::new(LocalizationManager::new()?))
}

/// Convenience function to get a localized message in user's language
pub fn t_lang(
    localization: &Arc<LocalizationManager>,
    key: &str,
    language_code: Option<&str>,
) -> String {
    let language = detect_language(localization, language_code);
    localization.get_message_in_language(key, &language, None)
}

/// Convenience function to get a localized message with arguments in user's language
pub fn t_args_lang(
    localization: &Arc<LocalizationManager>,
    key: &str,
    args: &[(&str, &str)],
    language_code: Option<&str>,
) -> String {
    let language = detect_language(localization, language_code);
    localization.get_message_with_args_in_language(key, &language, args)
}

/// Detect the appropriate language based on user's Telegram language code
pub fn detect_language(
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> String {
    if let Some(code) = language_code {
        // Extract language code (e.g., "he-IL" -> "he", "en-US" -> "en")
        let lang = if code.contains('-') {
            code.split('-').next().unwrap_or(DEFAULT_LANGUAGE)
        } else {
            code
        };

        if localization.is_language_supported(lang) {
            return lang.to_string();
        }
    }

    // Default to English if language not supported or not provided
    DEFAULT_LANGUAGE.to_string()
}
