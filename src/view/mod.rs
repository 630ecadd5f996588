//! Render descriptions for feature samples.
//!
//! These are plain data: the output renderers turn them into terminal text,
//! JSON or HTML, and [`SampleGroupSession`] rebuilds them after each page
//! transition.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::decode::{StrictDecoder, TokenGrouper, Utf8Decoder};
use crate::model::{Feature, Sample, SampleGroup, Token, TokenGroup};
use crate::pagination::{NavigationError, PageLink, Pager, Transition};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render a trailing run that never decoded (lossily) instead of
    /// dropping it.
    pub show_pending: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenView {
    pub bytes: Vec<u8>,
    pub feature_act: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenGroupView {
    pub text: String,
    pub max_feature_act: Option<f32>,
    /// Group peak relative to the feature's max activation, in `[0, 1]`.
    pub intensity: f32,
    pub tokens: Vec<TokenView>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub undecodable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleView {
    pub name: String,
    pub max_feature_act: Option<f32>,
    pub groups: Vec<TokenGroupView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaginationView {
    pub current: usize,
    pub max_page: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub links: Vec<PageLink>,
}

impl From<&Pager> for PaginationView {
    fn from(pager: &Pager) -> Self {
        Self {
            current: pager.current(),
            max_page: pager.max_page(),
            has_previous: pager.has_previous(),
            has_next: pager.has_next(),
            links: pager.page_links(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleGroupView {
    pub analysis_name: Option<String>,
    pub max_activation: Option<f32>,
    pub total_samples: usize,
    pub samples: Vec<SampleView>,
    pub pagination: PaginationView,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureView {
    pub title: String,
    pub max_feature_act: f32,
    pub groups: Vec<SampleGroupView>,
}

pub fn intensity(act: Option<f32>, max_feature_act: f32) -> f32 {
    match act {
        Some(act) if max_feature_act > 0.0 && act.is_finite() => {
            (act / max_feature_act).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

fn token_views(tokens: &[Token]) -> Vec<TokenView> {
    tokens
        .iter()
        .map(|t| TokenView {
            bytes: t.bytes.clone(),
            feature_act: t.feature_act,
        })
        .collect()
}

fn group_view(group: &TokenGroup, max_feature_act: f32) -> TokenGroupView {
    let peak = group.max_feature_act();
    TokenGroupView {
        text: group.text.clone(),
        max_feature_act: peak,
        intensity: intensity(peak, max_feature_act),
        tokens: token_views(&group.tokens),
        undecodable: false,
    }
}

fn pending_view(tokens: &[Token], bytes: &[u8], max_feature_act: f32) -> TokenGroupView {
    let peak = tokens.iter().map(|t| t.feature_act).reduce(f32::max);
    TokenGroupView {
        text: String::from_utf8_lossy(bytes).into_owned(),
        max_feature_act: peak,
        intensity: intensity(peak, max_feature_act),
        tokens: token_views(tokens),
        undecodable: true,
    }
}

pub fn render_sample<D: StrictDecoder>(
    sample: &Sample,
    name: &str,
    max_feature_act: f32,
    grouper: &TokenGrouper<D>,
    options: RenderOptions,
) -> SampleView {
    let grouping = grouper.split(sample.tokens());
    let mut groups: Vec<TokenGroupView> = grouping
        .groups
        .iter()
        .map(|g| group_view(g, max_feature_act))
        .collect();
    if options.show_pending && !grouping.pending.is_empty() {
        groups.push(pending_view(
            &grouping.pending,
            &grouping.pending_bytes(),
            max_feature_act,
        ));
    }
    SampleView {
        name: name.to_string(),
        max_feature_act: sample.max_feature_act(),
        groups,
    }
}

pub fn render_sample_group<D: StrictDecoder>(
    feature: &Feature,
    group: &SampleGroup,
    pager: &Pager,
    grouper: &TokenGrouper<D>,
    options: RenderOptions,
) -> SampleGroupView {
    let offset = pager.range().start;
    let samples = pager
        .slice(&group.samples)
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let name = format!("Sample {}", offset + i + 1);
            render_sample(sample, &name, feature.max_feature_act, grouper, options)
        })
        .collect();
    SampleGroupView {
        analysis_name: group.analysis_name.clone(),
        max_activation: group.max_activation(),
        total_samples: group.samples.len(),
        samples,
        pagination: PaginationView::from(pager),
    }
}

/// Renders every sample group of `feature` at `page` (clamped per group).
pub fn render_feature<D: StrictDecoder>(
    feature: &Feature,
    page: usize,
    page_size: NonZeroUsize,
    grouper: &TokenGrouper<D>,
    options: RenderOptions,
) -> FeatureView {
    let groups = feature
        .sample_groups
        .iter()
        .map(|group| {
            let pager = Pager::with_page(group.samples.len(), page_size, page);
            render_sample_group(feature, group, &pager, grouper, options)
        })
        .collect();
    FeatureView {
        title: feature.title(),
        max_feature_act: feature.max_feature_act,
        groups,
    }
}

/// One interactive rendering of a sample group; owns its current page.
#[derive(Clone, Debug)]
pub struct SampleGroupSession<'a, D = Utf8Decoder> {
    feature: &'a Feature,
    group: &'a SampleGroup,
    pager: Pager,
    grouper: TokenGrouper<D>,
    options: RenderOptions,
}

impl<'a> SampleGroupSession<'a, Utf8Decoder> {
    pub fn new(feature: &'a Feature, group: &'a SampleGroup, page_size: NonZeroUsize) -> Self {
        Self::with_grouper(feature, group, page_size, TokenGrouper::utf8())
    }
}

impl<'a, D: StrictDecoder> SampleGroupSession<'a, D> {
    pub fn with_grouper(
        feature: &'a Feature,
        group: &'a SampleGroup,
        page_size: NonZeroUsize,
        grouper: TokenGrouper<D>,
    ) -> Self {
        Self {
            feature,
            group,
            pager: Pager::new(group.samples.len(), page_size),
            grouper,
            options: RenderOptions::default(),
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn apply(&mut self, transition: Transition) -> Result<usize, NavigationError> {
        self.pager.apply(transition)
    }

    pub fn view(&self) -> SampleGroupView {
        render_sample_group(
            self.feature,
            self.group,
            &self.pager,
            &self.grouper,
            self.options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::default_page_size;

    fn sample(text: &str, acts: &[f32]) -> Sample {
        let bytes = text.as_bytes();
        Sample {
            context: bytes.iter().map(|b| vec![*b]).collect(),
            feature_acts: acts.iter().copied().cycle().take(bytes.len()).collect(),
        }
    }

    fn feature_with(samples: usize) -> Feature {
        Feature {
            max_feature_act: 4.0,
            sample_groups: vec![SampleGroup {
                analysis_name: Some("top_activations".to_string()),
                samples: (0..samples)
                    .map(|i| sample("ab", &[i as f32, 1.0]))
                    .collect(),
            }],
            ..Feature::default()
        }
    }

    #[test]
    fn sample_view_groups_and_scales() {
        let s = sample("né", &[1.0, 2.0, 3.0]);
        let view = render_sample(&s, "Sample 1", 4.0, &TokenGrouper::utf8(), RenderOptions::default());
        assert_eq!(view.name, "Sample 1");
        assert_eq!(view.max_feature_act, Some(3.0));
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.groups[1].text, "é");
        assert_eq!(view.groups[1].tokens.len(), 2);
        assert_eq!(view.groups[1].intensity, 0.75);
    }

    #[test]
    fn pending_tail_is_hidden_unless_requested() {
        let s = Sample {
            context: vec![b"x".to_vec(), vec![0xE2, 0x82]],
            feature_acts: vec![1.0, 2.0],
        };
        let grouper = TokenGrouper::utf8();
        let hidden = render_sample(&s, "s", 2.0, &grouper, RenderOptions::default());
        assert_eq!(hidden.groups.len(), 1);

        let shown = render_sample(&s, "s", 2.0, &grouper, RenderOptions { show_pending: true });
        assert_eq!(shown.groups.len(), 2);
        assert!(shown.groups[1].undecodable);
        assert_eq!(shown.groups[1].text, "\u{FFFD}");
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(intensity(Some(8.0), 4.0), 1.0);
        assert_eq!(intensity(Some(-1.0), 4.0), 0.0);
        assert_eq!(intensity(Some(1.0), 0.0), 0.0);
        assert_eq!(intensity(None, 4.0), 0.0);
    }

    #[test]
    fn session_labels_follow_the_page() {
        let feature = feature_with(12);
        let group = &feature.sample_groups[0];
        let mut session = SampleGroupSession::new(&feature, group, default_page_size());

        let first = session.view();
        assert_eq!(first.total_samples, 12);
        assert_eq!(first.samples.len(), 5);
        assert_eq!(first.samples[0].name, "Sample 1");
        assert_eq!(first.max_activation, Some(1.0));
        assert!(!first.pagination.has_previous);

        session.apply(Transition::JumpTo(3)).unwrap();
        let last = session.view();
        assert_eq!(last.samples.len(), 2);
        assert_eq!(last.samples[0].name, "Sample 11");
        assert!(!last.pagination.has_next);
        assert_eq!(session.apply(Transition::Next), Ok(3));
    }

    #[test]
    fn empty_group_renders_one_empty_page() {
        let feature = Feature {
            max_feature_act: 1.0,
            sample_groups: vec![SampleGroup::default()],
            ..Feature::default()
        };
        let view = render_feature(&feature, 3, default_page_size(), &TokenGrouper::utf8(), RenderOptions::default());
        let group = &view.groups[0];
        assert!(group.samples.is_empty());
        assert_eq!(group.max_activation, None);
        assert_eq!(group.pagination.current, 1);
        assert_eq!(group.pagination.max_page, 1);
    }
}
