//! None-rate diagnostics for the extractors.
//!
//! A none-rate is the fraction of processed listings for which an extractor
//! found nothing. It is reported with every run and never drives control
//! flow.

use crate::extract::ExtractedAttributes;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionDiagnostics {
    pub processed: usize,
    pub age_none: usize,
    pub model_none: usize,
    /// Listings without inch notation, whether or not centimeters rescued them.
    pub inch_none: usize,
    /// Listings with no size after reconciliation.
    pub size_none: usize,
}

impl ExtractionDiagnostics {
    /// Returns these counts with one more listing folded in.
    #[must_use]
    pub fn record(self, attrs: &ExtractedAttributes) -> Self {
        Self {
            processed: self.processed + 1,
            age_none: self.age_none + usize::from(attrs.age.is_none()),
            model_none: self.model_none + usize::from(attrs.model.is_none()),
            inch_none: self.inch_none + usize::from(attrs.size.inches.is_none()),
            size_none: self.size_none + usize::from(attrs.size.resolved().is_none()),
        }
    }

    #[must_use]
    pub fn from_attributes<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = &'a ExtractedAttributes>,
    {
        attrs.into_iter().fold(Self::default(), Self::record)
    }

    #[must_use]
    pub fn age_none_rate(&self) -> Option<f64> {
        self.rate(self.age_none)
    }

    #[must_use]
    pub fn model_none_rate(&self) -> Option<f64> {
        self.rate(self.model_none)
    }

    #[must_use]
    pub fn inch_none_rate(&self) -> Option<f64> {
        self.rate(self.inch_none)
    }

    #[must_use]
    pub fn size_none_rate(&self) -> Option<f64> {
        self.rate(self.size_none)
    }

    /// `None` when nothing was processed.
    #[allow(clippy::cast_precision_loss)]
    fn rate(&self, count: usize) -> Option<f64> {
        (self.processed > 0).then(|| count as f64 / self.processed as f64)
    }
}
