//! Request-construction tests for the composite difference workflow.

use ee_common::VisParams;
use ee_expr::{lower, ComputedObject, Expression, FeatureCollection, Filter, Image, Node};
use test_utils::fixtures::{display, images, region};

fn brazil() -> FeatureCollection {
    FeatureCollection::load(region::LSIB_TABLE)
        .filter(Filter::eq(region::COUNTRY_PROPERTY, region::BRAZIL))
}

// ============================================================================
// Normalized difference: built-in vs explicit
// ============================================================================

#[test]
fn test_builtin_and_explicit_ndvi_are_equivalent() {
    let image = Image::load(images::EARLY);

    let builtin = image.normalized_difference(images::NDVI_BANDS);
    let explicit = image.normalized_difference_explicit(images::NDVI_BANDS);

    // Different on the wire before lowering...
    assert_ne!(builtin.to_expression(), explicit.to_expression());

    // ...identical once the built-in is expanded.
    let lowered = Expression::from_node(&lower(builtin.node()));
    assert_eq!(lowered, explicit.to_expression());
}

#[test]
fn test_explicit_ndvi_operand_order() {
    let image = Image::load(images::EARLY);
    let nd = image.normalized_difference_explicit(["B4", "B3"]);

    let node = nd.node();
    assert_eq!(node.function_name(), Some("Image.rename"));

    let divide = node.argument("input").unwrap();
    assert_eq!(divide.function_name(), Some("Image.divide"));

    let numerator = divide.argument("image1").unwrap();
    let denominator = divide.argument("image2").unwrap();
    assert_eq!(numerator.function_name(), Some("Image.subtract"));
    assert_eq!(denominator.function_name(), Some("Image.add"));

    let bands = |n: &Node, side: &str| {
        n.argument(side)
            .and_then(|s| s.argument("bandSelectors"))
            .and_then(Node::as_string_list)
            .unwrap()
    };
    assert_eq!(bands(numerator, "image1"), vec!["B4"]);
    assert_eq!(bands(numerator, "image2"), vec!["B3"]);
    assert_eq!(bands(denominator, "image1"), vec!["B4"]);
    assert_eq!(bands(denominator, "image2"), vec!["B3"]);
}

#[test]
fn test_swapped_bands_are_not_equivalent() {
    let image = Image::load(images::EARLY);
    let builtin = image.normalized_difference(["B3", "B4"]);
    let explicit = image.normalized_difference_explicit(["B4", "B3"]);
    assert_ne!(
        Expression::from_node(&lower(builtin.node())),
        explicit.to_expression()
    );
}

#[test]
fn test_lowering_reaches_nested_calls() {
    let nd = Image::load(images::LATE).normalized_difference(images::NDVI_BANDS);
    let clipped = nd.clip(&brazil());
    let lowered = lower(clipped.node());
    assert_eq!(lowered.count_calls("Image.normalizedDifference"), 0);
    assert_eq!(lowered.count_calls("Image.divide"), 1);
    assert_eq!(lowered.function_name(), Some("Image.clip"));
}

// ============================================================================
// Composite subtraction
// ============================================================================

#[test]
fn test_subtraction_preserves_band_alignment() {
    let early = Image::load(images::EARLY).select(images::VIS_BANDS);
    let late = Image::load(images::LATE).select(images::VIS_BANDS);
    let diff = late.subtract(&early);

    let node = diff.node();
    assert_eq!(node.function_name(), Some("Image.subtract"));

    let lhs = node.argument("image1").unwrap();
    let rhs = node.argument("image2").unwrap();
    assert_eq!(
        lhs.argument("bandSelectors").and_then(Node::as_string_list),
        rhs.argument("bandSelectors").and_then(Node::as_string_list)
    );
    assert_eq!(
        lhs.argument("input")
            .and_then(|n| n.argument("id"))
            .and_then(Node::as_constant),
        Some(&serde_json::json!(images::LATE))
    );
}

#[test]
fn test_subtraction_wire_form() {
    let diff = Image::load(images::LATE).subtract(Image::load(images::EARLY));
    let expr = diff.to_expression();
    assert_eq!(
        expr.function_names(),
        vec!["Image.load", "Image.load", "Image.subtract"]
    );
    assert_eq!(expr.result, "2");
}

// ============================================================================
// Region selection and clipping
// ============================================================================

#[test]
fn test_region_filter_request() {
    let expr = brazil().to_expression();
    let json = expr.to_json();

    let root = &json["values"][&expr.result]["functionInvocationValue"];
    assert_eq!(root["functionName"], "Collection.filter");

    let filter_key = root["arguments"]["filter"]["valueReference"]
        .as_str()
        .unwrap();
    let filter = &json["values"][filter_key]["functionInvocationValue"];
    assert_eq!(filter["functionName"], "Filter.equals");
    assert_eq!(filter["arguments"]["leftField"]["constantValue"], "country_na");
    assert_eq!(filter["arguments"]["rightValue"]["constantValue"], "Brazil");
}

#[test]
fn test_clip_uses_collection_geometry() {
    let clipped = Image::load(images::LATE).clip(&brazil());
    let geometry = clipped.node().argument("geometry").unwrap();
    assert_eq!(geometry.function_name(), Some("Collection.geometry"));
}

#[test]
fn test_region_size_request() {
    let size = brazil().size();
    assert_eq!(size.node().function_name(), Some("Collection.size"));
    assert_eq!(size.node().count_calls("Collection.loadTable"), 1);
}

// ============================================================================
// Render request
// ============================================================================

#[test]
fn test_visualize_carries_literals_unchanged() {
    let vis = VisParams::stretch(images::VIS_BANDS, display::STRETCH_MIN, display::STRETCH_MAX);
    let expr = Image::load(images::LATE)
        .subtract(Image::load(images::EARLY))
        .clip(&brazil())
        .visualize(&vis)
        .unwrap()
        .to_expression();

    let json = expr.to_json();
    let root = &json["values"][&expr.result]["functionInvocationValue"];
    assert_eq!(root["functionName"], "Image.visualize");
    assert_eq!(
        root["arguments"]["bands"]["constantValue"],
        serde_json::json!(["B4", "B3", "B2"])
    );
    assert_eq!(root["arguments"]["min"]["constantValue"], -32.0);
    assert_eq!(root["arguments"]["max"]["constantValue"], 32.0);
}
