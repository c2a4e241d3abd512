//! Activity and field-selection configuration.
//!
//! Activities are the named categories of data a request pulls from a page.
//! Enabling is monotonic: once a category is on, only an explicit
//! reconfiguration changes its selector; nothing disables it implicitly.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Advisory emitted when a metadata activity is enabled without a field list.
pub const FIELDS_ADVISORY: &str = "no field selector provided; for performance, \
    request only the fields you need, or pass FieldSelector::All explicitly to \
    acknowledge extracting everything";

/// Field selection for a metadata activity (socials/video/product/article).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSelector {
    /// Extract every field the engine knows for this category
    All,
    /// Extract only the named fields, used verbatim (no dedup)
    Named(Vec<String>),
}

impl FieldSelector {
    /// Build a named selector from anything iterable.
    pub fn named(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Named(fields.into_iter().map(|f| f.into()).collect())
    }

    /// Resolve an optional caller-supplied selector for `category`.
    ///
    /// An omitted selector, or an explicit empty list, collapses to `All` and
    /// emits the one-time advisory. Passing `All` explicitly is silent: it
    /// signals an informed choice.
    pub(crate) fn resolve(category: &str, fields: Option<FieldSelector>) -> Self {
        match fields {
            Some(FieldSelector::All) => FieldSelector::All,
            Some(FieldSelector::Named(names)) if !names.is_empty() => {
                FieldSelector::Named(names)
            }
            _ => {
                warn!(category = category, "{}", FIELDS_ADVISORY);
                FieldSelector::All
            }
        }
    }
}

/// Which links to extract, resolved from [`LinkOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkFilter {
    Internal,
    External,
    All,
}

/// Caller-facing link extraction flags.
///
/// `all`, or `internal` and `external` together, resolve to [`LinkFilter::All`];
/// exactly one flag selects that side; no flags defaults to all links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    pub internal: bool,
    pub external: bool,
    pub all: bool,
}

impl LinkOptions {
    /// Only internal (same-domain) links.
    pub fn internal() -> Self {
        Self {
            internal: true,
            ..Default::default()
        }
    }

    /// Only external (cross-domain) links.
    pub fn external() -> Self {
        Self {
            external: true,
            ..Default::default()
        }
    }

    /// All links, explicitly.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    /// Whether any flag was set.
    pub fn any(&self) -> bool {
        self.internal || self.external || self.all
    }
}

impl LinkFilter {
    /// Apply the precedence rule to a set of flags.
    pub fn resolve(opts: LinkOptions) -> Self {
        if opts.all || (opts.internal && opts.external) {
            LinkFilter::All
        } else if opts.internal {
            LinkFilter::Internal
        } else if opts.external {
            LinkFilter::External
        } else {
            LinkFilter::All
        }
    }
}

/// Text activity configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextActivity {
    pub language_detection: bool,
}

/// The full activity set of one extraction request.
///
/// Each category is absent until its `extract_*` call enables it. Re-calling
/// replaces the selector rather than merging with the prior one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activities {
    pub text: Option<TextActivity>,
    pub links: Option<LinkFilter>,
    pub socials: Option<FieldSelector>,
    pub video: Option<FieldSelector>,
    pub product: Option<FieldSelector>,
    pub article: Option<FieldSelector>,
}

impl Activities {
    /// Whether at least one activity is enabled.
    pub fn any_enabled(&self) -> bool {
        self.text.is_some()
            || self.links.is_some()
            || self.socials.is_some()
            || self.video.is_some()
            || self.product.is_some()
            || self.article.is_some()
    }

    /// Whether language detection was requested.
    pub fn language_detection(&self) -> bool {
        self.text.map(|t| t.language_detection).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts warn-level events so advisory emission is observable.
    struct WarnCounter {
        warnings: Arc<AtomicUsize>,
    }

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, metadata: &tracing::Metadata<'_>) -> bool {
            *metadata.level() == tracing::Level::WARN
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, _: &tracing::Event<'_>) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_link_filter_precedence() {
        // (internal, external, all) -> expected
        let table = [
            ((false, false, false), LinkFilter::All),
            ((true, false, false), LinkFilter::Internal),
            ((false, true, false), LinkFilter::External),
            ((true, true, false), LinkFilter::All),
            ((false, false, true), LinkFilter::All),
            ((true, false, true), LinkFilter::All),
            ((false, true, true), LinkFilter::All),
            ((true, true, true), LinkFilter::All),
        ];

        for ((internal, external, all), expected) in table {
            let resolved = LinkFilter::resolve(LinkOptions {
                internal,
                external,
                all,
            });
            assert_eq!(
                resolved, expected,
                "flags internal={internal} external={external} all={all}"
            );
        }
    }

    #[test]
    fn test_selector_omission_collapses_to_all() {
        assert_eq!(FieldSelector::resolve("socials", None), FieldSelector::All);
        assert_eq!(
            FieldSelector::resolve("socials", Some(FieldSelector::Named(vec![]))),
            FieldSelector::All
        );
    }

    #[test]
    fn test_selector_explicit_all_and_named() {
        assert_eq!(
            FieldSelector::resolve("article", Some(FieldSelector::All)),
            FieldSelector::All
        );

        // Named lists are verbatim, duplicates included
        let named = FieldSelector::named(["title", "author", "title"]);
        assert_eq!(
            FieldSelector::resolve("article", Some(named.clone())),
            named
        );
    }

    #[test]
    fn test_omission_advisory_emitted_exactly_once_per_call() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = WarnCounter {
            warnings: warnings.clone(),
        };

        tracing::subscriber::with_default(subscriber, || {
            FieldSelector::resolve("socials", None);
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            // An explicit empty list is an omission too
            FieldSelector::resolve("video", Some(FieldSelector::Named(vec![])));
            assert_eq!(warnings.load(Ordering::SeqCst), 2);

            // The explicit all-sentinel and named lists stay silent
            FieldSelector::resolve("article", Some(FieldSelector::All));
            FieldSelector::resolve("product", Some(FieldSelector::named(["price"])));
            assert_eq!(warnings.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn test_activities_any_enabled() {
        let mut activities = Activities::default();
        assert!(!activities.any_enabled());

        activities.socials = Some(FieldSelector::All);
        assert!(activities.any_enabled());
    }

    #[test]
    fn test_language_detection_flag() {
        let mut activities = Activities::default();
        assert!(!activities.language_detection());

        activities.text = Some(TextActivity {
            language_detection: true,
        });
        assert!(activities.language_detection());
    }
}
