//! Image handles and band arithmetic.
//!
//! Every method returns a new handle describing a deferred remote
//! computation. Nothing is evaluated locally; malformed band names only
//! surface when the service evaluates or renders the image.

use ee_common::{EeError, EeResult, VisParams};

use crate::geometry::Geometry;
use crate::node::{ComputedObject, Node};

/// Name of the band produced by a normalized difference.
pub const NORMALIZED_DIFFERENCE_BAND: &str = "nd";

/// A reference to a remote multi-band raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Image(Node);

impl Image {
    /// Reference a catalog image by asset id.
    pub fn load(id: impl Into<String>) -> Self {
        Image(Node::invoke("Image.load", [("id", Node::from(id.into()))]))
    }

    /// A constant image with one band holding `value`.
    pub fn constant(value: f64) -> Self {
        Image(Node::invoke("Image.constant", [("value", Node::from(value))]))
    }

    /// A constant integer image, as required by the bitwise operators.
    pub fn constant_int(value: i64) -> Self {
        Image(Node::invoke("Image.constant", [("value", Node::from(value))]))
    }

    /// Wrap an existing node that evaluates to an image.
    pub fn from_node(node: Node) -> Self {
        Image(node)
    }

    pub fn into_node(self) -> Node {
        self.0
    }

    /// Keep only the named bands, in the given order.
    pub fn select<S: Into<String>>(&self, bands: impl IntoIterator<Item = S>) -> Image {
        self.call(
            "Image.select",
            [
                ("input", self.0.clone()),
                ("bandSelectors", Node::strings(bands)),
            ],
        )
    }

    /// Rename all bands.
    pub fn rename<S: Into<String>>(&self, names: impl IntoIterator<Item = S>) -> Image {
        self.call(
            "Image.rename",
            [("input", self.0.clone()), ("names", Node::strings(names))],
        )
    }

    pub fn add(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.add", other.into())
    }

    pub fn subtract(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.subtract", other.into())
    }

    pub fn multiply(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.multiply", other.into())
    }

    pub fn divide(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.divide", other.into())
    }

    pub fn bitwise_and(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.bitwiseAnd", other.into())
    }

    /// Per-pixel `==`, yielding 1 or 0.
    pub fn equals(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.eq", other.into())
    }

    /// Per-pixel `!=`, yielding 1 or 0.
    pub fn not_equals(&self, other: impl Into<Image>) -> Image {
        self.binary("Image.neq", other.into())
    }

    /// Mask out pixels where `mask` is zero.
    pub fn update_mask(&self, mask: impl Into<Image>) -> Image {
        self.call(
            "Image.updateMask",
            [("image", self.0.clone()), ("mask", mask.into().0)],
        )
    }

    /// Append the bands of `other` after this image's bands.
    pub fn add_bands(&self, other: impl Into<Image>) -> Image {
        self.call(
            "Image.addBands",
            [("dstImg", self.0.clone()), ("srcImg", other.into().0)],
        )
    }

    /// Concatenate the bands of several images, in order.
    pub fn cat(images: impl IntoIterator<Item = Image>) -> EeResult<Image> {
        let mut iter = images.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| EeError::invalid("images", "cannot concatenate zero images"))?;
        Ok(iter.fold(first, |acc, img| acc.add_bands(img)))
    }

    /// `(a - b) / (a + b)` computed by the service's built-in operator.
    pub fn normalized_difference(&self, bands: [&str; 2]) -> Image {
        self.call(
            "Image.normalizedDifference",
            [
                ("input", self.0.clone()),
                ("bandNames", Node::strings(bands)),
            ],
        )
    }

    /// `(a - b) / (a + b)` spelled out with primitive arithmetic.
    ///
    /// The result is renamed to `nd` so it matches the built-in operator's
    /// output band.
    pub fn normalized_difference_explicit(&self, bands: [&str; 2]) -> Image {
        let a = self.select([bands[0]]);
        let b = self.select([bands[1]]);
        a.subtract(&b)
            .divide(a.add(&b))
            .rename([NORMALIZED_DIFFERENCE_BAND])
    }

    /// Clip to a geometry; pixels outside are masked.
    pub fn clip(&self, geometry: impl Into<Geometry>) -> Image {
        self.call(
            "Image.clip",
            [
                ("input", self.0.clone()),
                ("geometry", geometry.into().into_node()),
            ],
        )
    }

    /// Apply a display stretch, producing an 8-bit RGB image.
    ///
    /// Fails only when a palette entry is not a recognizable color.
    pub fn visualize(&self, vis: &VisParams) -> EeResult<Image> {
        let mut args: Vec<(&str, Node)> = vec![
            ("image", self.0.clone()),
            ("bands", Node::strings(vis.bands.iter().cloned())),
            ("min", Node::from(vis.min)),
            ("max", Node::from(vis.max)),
        ];
        if let Some(gamma) = &vis.gamma {
            let g = if gamma.len() == 1 {
                Node::from(gamma[0])
            } else {
                Node::Array(gamma.iter().map(|v| Node::from(*v)).collect())
            };
            args.push(("gamma", g));
        }
        if let Some(palette) = vis.palette_hex()? {
            args.push(("palette", Node::strings(palette)));
        }
        if let Some(opacity) = vis.opacity {
            args.push(("opacity", Node::from(opacity)));
        }
        Ok(self.call("Image.visualize", args))
    }

    fn binary(&self, function: &str, other: Image) -> Image {
        self.call(function, [("image1", self.0.clone()), ("image2", other.0)])
    }

    fn call<'a>(&self, function: &str, args: impl IntoIterator<Item = (&'a str, Node)>) -> Image {
        Image(Node::invoke(function, args))
    }
}

impl ComputedObject for Image {
    fn node(&self) -> &Node {
        &self.0
    }
}

impl From<&Image> for Image {
    fn from(img: &Image) -> Self {
        img.clone()
    }
}

impl From<f64> for Image {
    fn from(v: f64) -> Self {
        Image::constant(v)
    }
}

impl From<i64> for Image {
    fn from(v: i64) -> Self {
        Image::constant_int(v)
    }
}

/// Rewrite every built-in normalized difference into explicit arithmetic.
///
/// Calls whose band list is absent or not exactly two literal names are
/// left untouched, since their meaning depends on the image's bands.
pub fn lower(node: &Node) -> Node {
    match node {
        Node::Constant(_) => node.clone(),
        Node::Array(items) => Node::Array(items.iter().map(lower).collect()),
        Node::Dictionary(map) => {
            Node::Dictionary(map.iter().map(|(k, v)| (k.clone(), lower(v))).collect())
        }
        Node::Invocation(inv) => {
            if inv.function == "Image.normalizedDifference" {
                let bands = inv.arguments.get("bandNames").and_then(Node::as_string_list);
                if let (Some(input), Some(bands)) = (inv.arguments.get("input"), bands) {
                    if bands.len() == 2 {
                        let input = Image::from_node(lower(input));
                        return input
                            .normalized_difference_explicit([bands[0].as_str(), bands[1].as_str()])
                            .into_node();
                    }
                }
            }
            Node::invoke(
                inv.function.clone(),
                inv.arguments.iter().map(|(k, v)| (k.as_str(), lower(v))),
            )
        }
    }
}
