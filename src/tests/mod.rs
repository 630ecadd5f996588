use crate::decode::TokenGrouper;
use crate::model::Feature;
use crate::pagination::{default_page_size, PageLink, Pager, Transition};
use crate::view::{RenderOptions, SampleGroupSession};

const FIXTURE: &str = include_str!("../../testdata/feature.json");

fn fixture() -> Feature {
    crate::model::parse_feature_json(FIXTURE, "testdata/feature.json").unwrap()
}

fn texts(view: &crate::view::SampleView) -> Vec<String> {
    view.groups.iter().map(|g| g.text.clone()).collect()
}

#[test]
fn fixture_loads_and_validates() {
    let feature = fixture();
    assert_eq!(feature.title(), "L4R #1842");
    assert_eq!(feature.sample_groups.len(), 2);
    assert_eq!(feature.sample_groups[0].samples.len(), 7);
    assert_eq!(feature.sample_groups[0].max_activation(), Some(4.0));
}

#[test]
fn first_page_regroups_split_characters() {
    let feature = fixture();
    let group = &feature.sample_groups[0];
    let session = SampleGroupSession::new(&feature, group, default_page_size());
    let view = session.view();

    assert_eq!(view.samples.len(), 5);
    assert_eq!(texts(&view.samples[0]), vec![" caf", "é", "!"]);
    assert_eq!(texts(&view.samples[1]), vec![" pay", "€", "5"]);
    assert_eq!(texts(&view.samples[2]), vec!["日本"]);
    assert_eq!(view.samples[2].groups[0].tokens.len(), 3);
    assert_eq!(view.samples[0].groups[1].intensity, 1.0);
    assert_eq!(view.samples[1].groups[1].max_feature_act, Some(3.5));
}

#[test]
fn second_page_continues_sample_numbering() {
    let feature = fixture();
    let group = &feature.sample_groups[0];
    let mut session = SampleGroupSession::new(&feature, group, default_page_size());
    assert_eq!(session.apply(Transition::Next), Ok(2));
    let view = session.view();
    let names: Vec<&str> = view.samples.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sample 6", "Sample 7"]);
    assert_eq!(
        view.pagination.links,
        vec![
            PageLink::Page {
                number: 1,
                active: false
            },
            PageLink::Page {
                number: 2,
                active: true
            },
        ]
    );
    assert_eq!(session.apply(Transition::Next), Ok(2));
}

#[test]
fn undecodable_tail_is_dropped_by_default() {
    let feature = fixture();
    let group = &feature.sample_groups[1];

    let plain = SampleGroupSession::new(&feature, group, default_page_size()).view();
    assert_eq!(texts(&plain.samples[0]), vec!["tail"]);

    let shown = SampleGroupSession::new(&feature, group, default_page_size())
        .options(RenderOptions { show_pending: true })
        .view();
    assert_eq!(shown.samples[0].groups.len(), 2);
    assert!(shown.samples[0].groups[1].undecodable);
}

#[test]
fn grouping_round_trips_fixture_bytes() {
    let feature = fixture();
    let grouper = TokenGrouper::utf8();
    for sample in &feature.sample_groups[0].samples {
        let original: Vec<u8> = sample.context.concat();
        let rebuilt: Vec<u8> = grouper
            .group(sample.tokens())
            .iter()
            .flat_map(|g| g.bytes())
            .collect();
        assert_eq!(rebuilt, original);
    }
}

#[test]
fn json_output_exposes_view_model() {
    let feature = fixture();
    let view = crate::view::render_feature(
        &feature,
        1,
        default_page_size(),
        &TokenGrouper::utf8(),
        RenderOptions::default(),
    );
    let rendered = crate::output::render_json(&view);
    let value: serde_json::Value = serde_json::from_slice(&rendered).unwrap();

    assert_eq!(value["title"], "L4R #1842");
    let first = &value["groups"][0];
    assert_eq!(first["analysis_name"], "top_activations");
    assert_eq!(first["samples"][0]["groups"][1]["text"], "é");
    assert_eq!(first["pagination"]["max_page"], 2);
    assert_eq!(first["pagination"]["links"][0]["kind"], "page");
    assert_eq!(first["pagination"]["links"][0]["active"], true);
}

#[test]
fn plain_text_output_lists_samples_and_pages() {
    let feature = fixture();
    let view = crate::view::render_feature(
        &feature,
        1,
        default_page_size(),
        &TokenGrouper::utf8(),
        RenderOptions::default(),
    );
    let text = String::from_utf8(crate::output::render_text(&view, false)).unwrap();
    assert!(text.starts_with("== L4R #1842 (max activation 4.000) =="));
    assert!(text.contains("-- top_activations --"));
    assert!(text.contains("Max Activation: 4.000"));
    assert!(text.contains("Sample 1:  café!"));
    assert!(text.contains("Sample 3: 日本"));
    assert!(text.contains("« [1] 2 »  (page 1/2)"));
    assert!(!text.contains('\u{1b}'));
}

#[test]
fn pager_tracks_large_feature() {
    let mut pager = Pager::new(100, default_page_size());
    assert_eq!(pager.max_page(), 20);
    assert_eq!(pager.apply(Transition::JumpTo(10)), Ok(10));
    let numbers: Vec<Option<usize>> = pager.page_links().iter().map(|l| l.number()).collect();
    assert_eq!(
        numbers,
        vec![
            Some(1),
            None,
            Some(8),
            Some(9),
            Some(10),
            Some(11),
            Some(12),
            None,
            Some(20)
        ]
    );
    assert_eq!(pager.apply(Transition::JumpTo(20)), Ok(20));
    assert_eq!(pager.apply(Transition::Next), Ok(20));
}
