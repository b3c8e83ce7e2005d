//! `indexcrop,x_|y_,i_`

use async_trait::async_trait;

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{split_kv, tokens, u32_in_range, unknown_param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCropOptions {
    pub axis: Axis,
    /// Slice length along `axis`.
    pub size: u32,
    pub index: u32,
}

impl IndexCropOptions {
    /// The `(x, y, w, h)` slice, or `None` when `index` is past the end.
    pub fn region(&self, (w, h): (u32, u32)) -> Option<(u32, u32, u32, u32)> {
        let total = match self.axis {
            Axis::X => w,
            Axis::Y => h,
        };
        let start = u64::from(self.index) * u64::from(self.size);
        if start >= u64::from(total) {
            return None;
        }
        let start = start as u32;
        let len = self.size.min(total - start);
        Some(match self.axis {
            Axis::X => (start, 0, len, h),
            Axis::Y => (0, start, w, len),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IndexCropAction;

#[async_trait]
impl Action for IndexCropAction {
    type Options = IndexCropOptions;

    fn name(&self) -> &'static str {
        "indexcrop"
    }

    fn validate(&self, params: &[&str]) -> Result<IndexCropOptions> {
        let mut x = None;
        let mut y = None;
        let mut index = 0;
        for token in tokens(self.name(), params) {
            let (key, value) = split_kv(token);
            match key {
                "x" => x = Some(u32_in_range("X", value, 1, 16384)?),
                "y" => y = Some(u32_in_range("Y", value, 1, 16384)?),
                "i" => index = u32_in_range("Index", value, 0, u32::MAX / 2)?,
                _ => return Err(unknown_param(key)),
            }
        }
        let (axis, size) = match (x, y) {
            (Some(s), None) => (Axis::X, s),
            (None, Some(s)) => (Axis::Y, s),
            _ => return Err(Error::invalid("Indexcrop requires exactly one of x or y")),
        };
        Ok(IndexCropOptions { axis, size, index })
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: IndexCropOptions) -> Result<()> {
        let Some((x, y, w, h)) = opts.region((ctx.image.width(), ctx.image.height())) else {
            tracing::debug!("Indexcrop slice {} is past the end; unchanged", opts.index);
            return Ok(());
        };
        ctx.image.map(move |img| Ok(img.crop_imm(x, y, w, h))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices() {
        let opts = IndexCropAction.validate(&["indexcrop", "x_30", "i_1"]).unwrap();
        assert_eq!(opts.region((100, 40)), Some((30, 0, 30, 40)));

        let last = IndexCropAction.validate(&["indexcrop", "y_30", "i_1"]).unwrap();
        assert_eq!(last.region((100, 40)), Some((0, 30, 100, 10)));

        let past = IndexCropAction.validate(&["indexcrop", "x_30", "i_4"]).unwrap();
        assert_eq!(past.region((100, 40)), None);
    }

    #[test]
    fn exactly_one_axis() {
        assert!(IndexCropAction.validate(&["indexcrop", "i_1"]).is_err());
        assert!(IndexCropAction
            .validate(&["indexcrop", "x_10", "y_10"])
            .is_err());
    }
}
