use crate::models::{FormatVariant, SelectableOption};

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Turns the raw variant list into the quality choices offered to a user.
///
/// Only combined (video + audio) variants survive. Input order is kept and
/// identical labels are not merged; each option's `format_id` is copied
/// verbatim from its variant.
pub fn selectable(variants: &[FormatVariant]) -> Vec<SelectableOption> {
    variants
        .iter()
        .filter(|v| v.is_combined())
        .map(|v| SelectableOption {
            label: label_for(v),
            format_id: v.format_id.clone(),
        })
        .collect()
}

/// `"<height or Unknown>p (<ext>) - <size>"`
pub fn label_for(variant: &FormatVariant) -> String {
    let resolution = variant
        .height
        .map_or_else(|| "Unknown".to_string(), |h| h.to_string());
    format!("{}p ({}) - {}", resolution, variant.container(), size_label(variant.filesize))
}

fn size_label(size: Option<u64>) -> String {
    match size {
        Some(bytes) => format!("{:.2} MB", bytes as f64 / BYTES_PER_MB),
        None => "Size not available".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn variant(id: &str, height: Option<u32>, size: Option<u64>) -> FormatVariant {
        FormatVariant {
            format_id: id.to_string(),
            vcodec: Some("avc1.64001f".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            height,
            ext: Some("mp4".to_string()),
            filesize: size,
        }
    }

    fn video_only(id: &str, height: Option<u32>) -> FormatVariant {
        FormatVariant { acodec: Some("none".to_string()), ..variant(id, height, None) }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(selectable(&[]).is_empty());
    }

    #[test]
    fn labels_known_and_unknown_sizes() {
        let options = selectable(&[
            variant("a", Some(720), Some(5_242_880)),
            variant("b", Some(1080), None),
            video_only("c", Some(1080)),
        ]);

        assert_eq!(
            options,
            vec![
                SelectableOption { label: "720p (mp4) - 5.00 MB".into(), format_id: "a".into() },
                SelectableOption { label: "1080p (mp4) - Size not available".into(), format_id: "b".into() },
            ]
        );
    }

    #[test]
    fn ten_megabytes_formats_to_two_decimals() {
        let label = label_for(&variant("x", Some(480), Some(10_485_760)));
        assert!(label.contains("10.00 MB"), "{label}");
    }

    #[test]
    fn unknown_height_label() {
        let label = label_for(&variant("x", None, None));
        assert!(label.starts_with("Unknownp"), "{label}");
        assert_eq!(label, "Unknownp (mp4) - Size not available");
    }

    #[test]
    fn audio_only_is_dropped() {
        let audio = FormatVariant {
            vcodec: Some("none".to_string()),
            ..variant("aud", None, Some(1))
        };
        assert!(selectable(&[audio]).is_empty());
    }

    #[test]
    fn one_combined_among_nine_silent() {
        let mut variants: Vec<_> = (0..9).map(|i| video_only(&format!("v{i}"), Some(360))).collect();
        variants.insert(4, variant("keep", Some(720), None));

        let options = selectable(&variants);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].format_id, "keep");
    }

    #[test]
    fn duplicate_labels_stay_separate() {
        let options = selectable(&[
            variant("hls-1", Some(720), None),
            variant("http-1", Some(720), None),
        ]);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, options[1].label);
        assert_ne!(options[0].format_id, options[1].format_id);
    }

    fn arb_codec() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("none".to_string())),
            "[a-z0-9.]{1,8}".prop_map(Some),
        ]
    }

    fn arb_variant() -> impl Strategy<Value = FormatVariant> {
        (
            "[a-z0-9-]{1,6}",
            arb_codec(),
            arb_codec(),
            proptest::option::of(1u32..4320),
            proptest::option::of("[a-z0-9]{2,4}"),
            proptest::option::of(0u64..10_000_000_000),
        )
            .prop_map(|(format_id, vcodec, acodec, height, ext, filesize)| FormatVariant {
                format_id,
                vcodec,
                acodec,
                height,
                ext,
                filesize,
            })
    }

    proptest! {
        #[test]
        fn output_is_an_ordered_subset_of_combined_input(variants in proptest::collection::vec(arb_variant(), 0..20)) {
            let options = selectable(&variants);
            prop_assert!(options.len() <= variants.len());

            let combined: Vec<&FormatVariant> = variants.iter().filter(|v| v.is_combined()).collect();
            prop_assert_eq!(options.len(), combined.len());
            for (option, source) in options.iter().zip(combined) {
                prop_assert_eq!(&option.format_id, &source.format_id);
                prop_assert!(source.has_video() && source.has_audio());
            }
        }

        #[test]
        fn size_suffix_matches_presence(v in arb_variant()) {
            let label = label_for(&v);
            match v.filesize {
                None => prop_assert!(label.ends_with("Size not available")),
                Some(_) => prop_assert!(label.ends_with(" MB")),
            }
            if v.height.is_none() {
                prop_assert!(label.starts_with("Unknownp"));
            }
        }
    }
}
