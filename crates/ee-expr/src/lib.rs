//! Server-side imagery expressions.
//!
//! This crate builds typed, immutable descriptions of remote computations
//! (images, feature collections, filters, geometries) and encodes them into
//! the flat value graph accepted by the imagery service's REST API.
//!
//! # Example
//!
//! ```rust
//! use ee_expr::{ComputedObject, Filter, FeatureCollection, Image};
//!
//! let brazil = FeatureCollection::load("USDOS/LSIB_SIMPLE/2017")
//!     .filter(Filter::eq("country_na", "Brazil"));
//! let early = Image::load("LANDSAT/LE7_TOA_5YEAR/1999_2003");
//! let late = Image::load("LANDSAT/LE7_TOA_5YEAR/2008_2012");
//! let diff = late.subtract(&early).clip(&brazil);
//!
//! let expr = diff.to_expression();
//! assert_eq!(expr.function_names().last(), Some(&"Image.clip"));
//! ```

pub mod collection;
pub mod expression;
pub mod filter;
pub mod geometry;
pub mod image;
pub mod landsat;
pub mod node;

pub use collection::{Feature, FeatureCollection, Number};
pub use expression::{Expression, ValueNode};
pub use filter::Filter;
pub use geometry::Geometry;
pub use image::{lower, Image, NORMALIZED_DIFFERENCE_BAND};
pub use node::{ComputedObject, Invocation, Node};
