//! Landsat-specific helpers: survey date windows and QA bit masks.

use chrono::NaiveDate;
use ee_common::{EeError, EeResult};

use crate::image::Image;

/// Asset ids of the Landsat 7 TOA 5-year composites.
pub mod composites {
    pub const LE7_TOA_1999_2003: &str = "LANDSAT/LE7_TOA_5YEAR/1999_2003";
    pub const LE7_TOA_2008_2012: &str = "LANDSAT/LE7_TOA_5YEAR/2008_2012";
}

/// Three-year image window for a survey that started in `survey_year`.
///
/// Calibrated DMSP nightlights only exist for a few date ranges, so the
/// 2006-2008 window is stretched to the end of 2010 when `nightlights` is set.
pub fn survey_year_to_range(survey_year: i32, nightlights: bool) -> EeResult<(NaiveDate, NaiveDate)> {
    let (start, end) = match survey_year {
        2003..=2005 => (2003, 2005),
        2006..=2008 => (2006, if nightlights { 2010 } else { 2008 }),
        2009..=2011 => (2009, 2011),
        2012..=2014 => (2012, 2014),
        2015..=2017 => (2015, 2017),
        _ => {
            return Err(EeError::invalid(
                "survey_year",
                format!("{} is outside 2003..=2017", survey_year),
            ))
        }
    };
    Ok((date(start, 1, 1)?, date(end, 12, 31)?))
}

fn date(y: i32, m: u32, d: u32) -> EeResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| EeError::invalid("date", format!("{}-{}-{} is not a date", y, m, d)))
}

/// Pixel QA flags shared by Landsat 5/7/8 surface reflectance products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaFlag {
    Clear,
    Water,
    CloudShadow,
    Snow,
    /// Set when the pixel is *not* cloudy.
    NotCloud,
}

impl QaFlag {
    pub const ALL: [QaFlag; 5] = [
        QaFlag::Clear,
        QaFlag::Water,
        QaFlag::CloudShadow,
        QaFlag::Snow,
        QaFlag::NotCloud,
    ];

    /// Bit value in the `pixel_qa` band.
    pub fn bit(self) -> i64 {
        match self {
            QaFlag::Clear => 1 << 1,
            QaFlag::Water => 1 << 2,
            QaFlag::CloudShadow => 1 << 3,
            QaFlag::Snow => 1 << 4,
            QaFlag::NotCloud => 1 << 5,
        }
    }

    pub fn band_name(self) -> &'static str {
        match self {
            QaFlag::Clear => "pxqa_clear",
            QaFlag::Water => "pxqa_water",
            QaFlag::CloudShadow => "pxqa_cloudshadow",
            QaFlag::Snow => "pxqa_snow",
            QaFlag::NotCloud => "pxqa_cloud",
        }
    }
}

/// Decode the `pixel_qa` band into five self-masked flag bands.
pub fn decode_qa_mask(image: &Image) -> EeResult<Image> {
    let qa = image.select(["pixel_qa"]);
    Image::cat(QaFlag::ALL.iter().map(|flag| {
        let bits = qa.bitwise_and(flag.bit());
        let mask = match flag {
            QaFlag::NotCloud => bits.equals(0_i64),
            _ => bits.not_equals(0_i64),
        };
        mask.update_mask(&mask).rename([flag.band_name()])
    }))
}
