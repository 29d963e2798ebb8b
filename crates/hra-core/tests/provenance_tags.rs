use std::collections::BTreeSet;

use hra_core::{Regulation, SourceTag};

#[test]
fn tags_render_like_artifact_comments() {
    assert_eq!(SourceTag::Source(12).to_string(), "Source:12");
    assert_eq!(SourceTag::File(7).to_string(), "File:007");
}

#[test]
fn tags_order_deterministically() {
    let tags: BTreeSet<SourceTag> = [
        SourceTag::File(1),
        SourceTag::Source(4),
        SourceTag::Source(2),
    ]
    .into_iter()
    .collect();
    let ordered: Vec<_> = tags.into_iter().collect();
    assert_eq!(
        ordered,
        vec![SourceTag::Source(2), SourceTag::Source(4), SourceTag::File(1)]
    );
}

#[test]
fn regulation_labels_parse_and_render() {
    assert_eq!(Regulation::from_label(0).unwrap(), Regulation::Gray);
    assert_eq!(Regulation::from_label(1).unwrap(), Regulation::Black);
    assert_eq!(Regulation::from_label(2).unwrap_err().code(), "invalid-regulation");
    assert_eq!(Regulation::Black.to_string(), "1");
    assert_eq!(Regulation::from_bit(0b10, 1), Regulation::Black);
    assert_eq!(Regulation::from_bit(0b10, 0), Regulation::Gray);
}
