//! Result normalisation: provider pages → [`ParseResult`].
//!
//! Pure and synchronous. Malformed upstream data is tolerated rather than
//! rejected:
//!
//! * a missing corner counts as `0`
//! * a missing or zero page dimension divides by `1`, so the "relative"
//!   value is the raw pixel value
//! * a negative width or height passes through unchecked
//!
//! Each page gets its own [`ImageRefs`], so two pages reusing an id never see
//! each other's images.

use crate::document::{OcrDocument, OcrPage, PageDimensions, PageImage};
use crate::output::{NormalizedImage, NormalizedPage, OriginalBox, ParseResult, RelativeBox};
use crate::pipeline::encode::to_data_url;
use crate::pipeline::reconcile::{rewrite_placeholders, ImageRefs};
use tracing::debug;

/// Separator between pages in the combined text outputs.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Normalise a whole provider response.
///
/// Pages are ordered by ascending `index` (stable for equal indices). An
/// empty page list yields [`ParseResult::default`].
pub fn normalize_document(document: OcrDocument) -> ParseResult {
    let OcrDocument {
        mut pages,
        model,
        usage_info,
    } = document;

    pages.sort_by_key(|p| p.index);
    let pages: Vec<NormalizedPage> = pages.into_iter().map(normalize_page).collect();

    let text = pages
        .iter()
        .map(|p| p.markdown.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);
    let raw_text = pages
        .iter()
        .map(|p| p.raw_markdown.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);
    let images = pages.iter().flat_map(|p| p.images.iter().cloned()).collect();

    ParseResult {
        text,
        raw_text,
        pages,
        images,
        usage: usage_info,
        model,
    }
}

/// Normalise one page: compute image boxes, then rewrite its placeholders.
pub fn normalize_page(page: OcrPage) -> NormalizedPage {
    let mut refs = ImageRefs::new();

    let images: Vec<NormalizedImage> = page
        .images
        .iter()
        .map(|image| {
            let normalized = normalize_image(image, page.dimensions.as_ref());
            if image.image_base64.is_some() {
                refs.insert(normalized.id.clone(), normalized.url.clone());
            }
            normalized
        })
        .collect();

    let markdown = rewrite_placeholders(&page.markdown, &refs);
    debug!(
        "Page {}: {} images, {} placeholders resolvable",
        page.index,
        images.len(),
        refs.len()
    );

    NormalizedPage {
        index: page.index,
        markdown,
        raw_markdown: page.markdown,
        images,
        dimensions: page.dimensions,
    }
}

/// Normalise one image against its page's dimensions.
pub fn normalize_image(image: &PageImage, dimensions: Option<&PageDimensions>) -> NormalizedImage {
    let (page_width, page_height) = page_divisors(dimensions);

    let left = image.top_left_x.unwrap_or(0.0);
    let top = image.top_left_y.unwrap_or(0.0);
    let width = image.bottom_right_x.unwrap_or(0.0) - left;
    let height = image.bottom_right_y.unwrap_or(0.0) - top;

    NormalizedImage {
        id: image.id.clone(),
        url: image
            .image_base64
            .as_deref()
            .map(to_data_url)
            .unwrap_or_default(),
        coordinates: RelativeBox {
            x: left / page_width,
            y: top / page_height,
            width: width / page_width,
            height: height / page_height,
        },
        original_coordinates: OriginalBox {
            top_left_x: image.top_left_x,
            top_left_y: image.top_left_y,
            bottom_right_x: image.bottom_right_x,
            bottom_right_y: image.bottom_right_y,
        },
    }
}

fn page_divisors(dimensions: Option<&PageDimensions>) -> (f64, f64) {
    let nonzero_or_one = |v: f64| if v == 0.0 { 1.0 } else { v };
    match dimensions {
        Some(d) => (nonzero_or_one(d.width), nonzero_or_one(d.height)),
        None => (1.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::UsageInfo;

    const EPS: f64 = 1e-9;

    fn image(id: &str, tl: (f64, f64), br: (f64, f64), data: &str) -> PageImage {
        PageImage {
            id: id.into(),
            top_left_x: Some(tl.0),
            top_left_y: Some(tl.1),
            bottom_right_x: Some(br.0),
            bottom_right_y: Some(br.1),
            image_base64: Some(data.into()),
        }
    }

    fn dims(width: f64, height: f64) -> Option<PageDimensions> {
        Some(PageDimensions {
            dpi: 200,
            width,
            height,
        })
    }

    fn page(index: u32, markdown: &str, images: Vec<PageImage>, d: Option<PageDimensions>) -> OcrPage {
        OcrPage {
            index,
            markdown: markdown.into(),
            images,
            dimensions: d,
        }
    }

    #[test]
    fn single_image_relative_box() {
        let img = image("img-1", (10.0, 20.0), (110.0, 220.0), "data:image/png;base64,AA");
        let n = normalize_image(&img, dims(200.0, 400.0).as_ref());
        assert!((n.coordinates.x - 0.05).abs() < EPS);
        assert!((n.coordinates.y - 0.05).abs() < EPS);
        assert!((n.coordinates.width - 0.5).abs() < EPS);
        assert!((n.coordinates.height - 0.5).abs() < EPS);
        assert_eq!(n.url, "data:image/png;base64,AA");
    }

    #[test]
    fn relative_box_scales_back_to_source() {
        let (pw, ph) = (1700.0, 2200.0);
        let img = image("a", (123.0, 456.0), (789.0, 1011.0), "data:x;base64,");
        let n = normalize_image(&img, dims(pw, ph).as_ref());
        let (x, y, w, h) = n.coordinates.to_pixels(pw, ph);
        assert!((x - 123.0).abs() < 1e-6);
        assert!((y - 456.0).abs() < 1e-6);
        assert!((w - (789.0 - 123.0)).abs() < 1e-6);
        assert!((h - (1011.0 - 456.0)).abs() < 1e-6);
    }

    #[test]
    fn zero_or_absent_dimensions_divide_by_one() {
        let img = image("a", (10.0, 20.0), (30.0, 60.0), "data:x;base64,");
        for d in [None, dims(0.0, 0.0)] {
            let n = normalize_image(&img, d.as_ref());
            assert_eq!(
                n.coordinates,
                RelativeBox {
                    x: 10.0,
                    y: 20.0,
                    width: 20.0,
                    height: 40.0
                }
            );
        }
    }

    #[test]
    fn missing_corners_default_to_zero_and_stay_null() {
        let img = PageImage {
            id: "a".into(),
            bottom_right_x: Some(50.0),
            ..Default::default()
        };
        let n = normalize_image(&img, dims(100.0, 100.0).as_ref());
        assert_eq!(n.coordinates.x, 0.0);
        assert_eq!(n.coordinates.width, 0.5);
        assert_eq!(n.coordinates.height, 0.0);
        assert_eq!(n.original_coordinates.top_left_x, None);
        assert_eq!(n.original_coordinates.bottom_right_x, Some(50.0));
        assert_eq!(n.url, "");
    }

    #[test]
    fn negative_extent_passes_through() {
        let img = image("a", (50.0, 50.0), (10.0, 10.0), "data:x;base64,");
        let n = normalize_image(&img, dims(100.0, 100.0).as_ref());
        assert!((n.coordinates.width + 0.4).abs() < EPS);
    }

    #[test]
    fn raw_markdown_survives_substitution() {
        let raw = "![img-1](img-1)\n\n![img-1](img-1)";
        let p = normalize_page(page(
            0,
            raw,
            vec![image("img-1", (0.0, 0.0), (1.0, 1.0), "data:u;base64,")],
            dims(10.0, 10.0),
        ));
        assert_eq!(p.raw_markdown, raw);
        assert_eq!(p.markdown, "![img-1](data:u;base64,)\n\n![img-1](data:u;base64,)");
    }

    #[test]
    fn unmatched_placeholder_left_as_is() {
        let raw = "![ghost.png](ghost.png)";
        let p = normalize_page(page(0, raw, vec![], dims(10.0, 10.0)));
        assert_eq!(p.markdown, raw);
    }

    #[test]
    fn image_without_inline_data_is_not_substituted() {
        let img = PageImage {
            id: "img-0".into(),
            ..Default::default()
        };
        let p = normalize_page(page(0, "![img-0](img-0)", vec![img], None));
        assert_eq!(p.markdown, "![img-0](img-0)");
    }

    #[test]
    fn duplicate_ids_on_one_page_last_write_wins() {
        let p = normalize_page(page(
            0,
            "![dup](dup)",
            vec![
                image("dup", (0.0, 0.0), (1.0, 1.0), "data:first;base64,"),
                image("dup", (0.0, 0.0), (1.0, 1.0), "data:second;base64,"),
            ],
            dims(10.0, 10.0),
        ));
        assert_eq!(p.markdown, "![dup](data:second;base64,)");
        assert_eq!(p.images.len(), 2);
    }

    #[test]
    fn same_id_on_two_pages_does_not_leak() {
        let doc = OcrDocument {
            pages: vec![
                page(
                    0,
                    "![img-1](img-1)",
                    vec![image("img-1", (0.0, 0.0), (1.0, 1.0), "data:p1;base64,")],
                    dims(10.0, 10.0),
                ),
                page(
                    1,
                    "![img-1](img-1)",
                    vec![image("img-1", (0.0, 0.0), (1.0, 1.0), "data:p2;base64,")],
                    dims(10.0, 10.0),
                ),
            ],
            ..Default::default()
        };
        let r = normalize_document(doc);
        assert_eq!(r.pages[0].markdown, "![img-1](data:p1;base64,)");
        assert_eq!(r.pages[1].markdown, "![img-1](data:p2;base64,)");
        assert_eq!(r.text, "![img-1](data:p1;base64,)\n\n![img-1](data:p2;base64,)");
        assert_eq!(r.raw_text, "![img-1](img-1)\n\n![img-1](img-1)");
    }

    #[test]
    fn zero_pages_yield_empty_result() {
        let r = normalize_document(OcrDocument::default());
        assert_eq!(r.text, "");
        assert_eq!(r.raw_text, "");
        assert!(r.pages.is_empty());
        assert!(r.images.is_empty());
    }

    #[test]
    fn pages_sorted_and_images_flattened_in_order() {
        let doc = OcrDocument {
            pages: vec![
                page(
                    1,
                    "second",
                    vec![image("c", (0.0, 0.0), (1.0, 1.0), "data:c;base64,")],
                    dims(10.0, 10.0),
                ),
                page(
                    0,
                    "first",
                    vec![
                        image("a", (0.0, 0.0), (1.0, 1.0), "data:a;base64,"),
                        image("b", (0.0, 0.0), (1.0, 1.0), "data:b;base64,"),
                    ],
                    dims(10.0, 10.0),
                ),
            ],
            model: "mistral-ocr-latest".into(),
            usage_info: Some(UsageInfo {
                pages_processed: 2,
                doc_size_bytes: Some(1024),
            }),
        };
        let r = normalize_document(doc);
        assert_eq!(r.text, "first\n\nsecond");
        let ids: Vec<&str> = r.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(r.model, "mistral-ocr-latest");
        assert_eq!(r.usage.unwrap().pages_processed, 2);
    }
}
