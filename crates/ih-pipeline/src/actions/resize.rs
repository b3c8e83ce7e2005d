//! `resize,m_<mode>,w_,h_,l_,s_,p_,limit_,color_`

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use ih_core::{Error, Result};

use crate::action::Action;
use crate::context::ImageContext;
use crate::params::{hex_color, int_in_range, split_kv, tokens, u32_in_range, unknown_param};

const MAX_SIDE: u32 = 16384;

/// Largest output the engine will allocate: 512 MiB of RGBA8.
const MAX_PIXELS: u64 = 512 * 1024 * 1024 / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Fit inside the box.
    #[default]
    Lfit,
    /// Cover the box.
    Mfit,
    /// Cover the box, then centre-crop to it.
    Fill,
    /// Fit inside the box, then pad to it.
    Pad,
    /// Exactly the box, ignoring aspect ratio.
    Fixed,
}

impl ResizeMode {
    fn parse(value: &str) -> Result<Self> {
        Ok(match value {
            "lfit" => Self::Lfit,
            "mfit" => Self::Mfit,
            "fill" => Self::Fill,
            "pad" => Self::Pad,
            "fixed" => Self::Fixed,
            other => return Err(Error::invalid(format!("Unknown resize mode: \"{other}\""))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub mode: ResizeMode,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub long: Option<u32>,
    pub short: Option<u32>,
    pub percent: Option<u32>,
    /// Never enlarge.
    pub limit: bool,
    pub color: [u8; 3],
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Lfit,
            width: None,
            height: None,
            long: None,
            short: None,
            percent: None,
            limit: true,
            color: [255, 255, 255],
        }
    }
}

impl ResizeOptions {
    /// Target box for an image of `src` size; either side may be open.
    fn target_box(&self, (w, h): (u32, u32)) -> (Option<u32>, Option<u32>) {
        let mut tw = self.width;
        let mut th = self.height;
        let landscape = w >= h;
        if let Some(l) = self.long {
            if landscape {
                tw.get_or_insert(l);
            } else {
                th.get_or_insert(l);
            }
        }
        if let Some(s) = self.short {
            if landscape {
                th.get_or_insert(s);
            } else {
                tw.get_or_insert(s);
            }
        }
        (tw, th)
    }

    /// Size the image is scaled to before any crop or pad, and the final
    /// canvas size.
    fn plan(&self, src: (u32, u32)) -> Plan {
        let (w, h) = (f64::from(src.0), f64::from(src.1));

        let (tw, th) = self.target_box(src);
        if tw.is_none() && th.is_none() {
            // Only p_ was given.
            let p = f64::from(self.percent.unwrap_or(100)) / 100.0;
            let size = (scaled(w, p), scaled(h, p));
            return Plan {
                scaled: size,
                canvas: size,
            };
        }

        let rx = tw.map(|t| f64::from(t) / w);
        let ry = th.map(|t| f64::from(t) / h);
        let fit = |pick: fn(f64, f64) -> f64| match (rx, ry) {
            (Some(x), Some(y)) => pick(x, y),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => 1.0,
        };

        match self.mode {
            ResizeMode::Lfit => {
                let r = fit(f64::min);
                let size = (scaled(w, r), scaled(h, r));
                Plan {
                    scaled: size,
                    canvas: size,
                }
            }
            ResizeMode::Mfit => {
                let r = fit(f64::max);
                let size = (scaled(w, r), scaled(h, r));
                Plan {
                    scaled: size,
                    canvas: size,
                }
            }
            ResizeMode::Fill | ResizeMode::Pad => {
                let pick: fn(f64, f64) -> f64 = if self.mode == ResizeMode::Fill {
                    f64::max
                } else {
                    f64::min
                };
                let r = fit(pick);
                let canvas = (
                    tw.unwrap_or_else(|| scaled(w, r)),
                    th.unwrap_or_else(|| scaled(h, r)),
                );
                Plan {
                    scaled: (scaled(w, r), scaled(h, r)),
                    canvas,
                }
            }
            ResizeMode::Fixed => {
                let r = fit(f64::min);
                let size = (tw.unwrap_or_else(|| scaled(w, r)), th.unwrap_or_else(|| scaled(h, r)));
                Plan {
                    scaled: size,
                    canvas: size,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    scaled: (u32, u32),
    canvas: (u32, u32),
}

impl Plan {
    /// Reject targets whose buffers the engine could not allocate.
    fn check_bounds(&self) -> Result<()> {
        for (w, h) in [self.scaled, self.canvas] {
            if w > MAX_SIDE || h > MAX_SIDE {
                return Err(Error::invalid(format!(
                    "Resize target exceeds {MAX_SIDE}px per side ({w}x{h})"
                )));
            }
            if u64::from(w) * u64::from(h) > MAX_PIXELS {
                return Err(Error::invalid(format!(
                    "Resize target exceeds {MAX_PIXELS} pixels ({w}x{h})"
                )));
            }
        }
        Ok(())
    }
}

fn scaled(side: f64, ratio: f64) -> u32 {
    ((side * ratio).round() as u32).max(1)
}

#[derive(Debug, Clone, Copy)]
pub struct ResizeAction;

#[async_trait]
impl Action for ResizeAction {
    type Options = ResizeOptions;

    fn name(&self) -> &'static str {
        "resize"
    }

    fn validate(&self, params: &[&str]) -> Result<ResizeOptions> {
        let mut opts = ResizeOptions::default();
        for token in tokens(self.name(), params) {
            let (key, value) = split_kv(token);
            match key {
                "m" => opts.mode = ResizeMode::parse(value)?,
                "w" => opts.width = Some(u32_in_range("Width", value, 1, MAX_SIDE)?),
                "h" => opts.height = Some(u32_in_range("Height", value, 1, MAX_SIDE)?),
                "l" => opts.long = Some(u32_in_range("Long side", value, 1, MAX_SIDE)?),
                "s" => opts.short = Some(u32_in_range("Short side", value, 1, MAX_SIDE)?),
                "p" => opts.percent = Some(u32_in_range("Percent", value, 1, 1000)?),
                "limit" => opts.limit = int_in_range("Limit", value, 0, 1)? == 1,
                "color" => opts.color = hex_color(value)?,
                _ => return Err(unknown_param(key)),
            }
        }
        if opts.width.is_none()
            && opts.height.is_none()
            && opts.long.is_none()
            && opts.short.is_none()
            && opts.percent.is_none()
        {
            return Err(Error::invalid("Resize requires one of w, h, l, s or p"));
        }
        Ok(opts)
    }

    async fn apply(&self, ctx: &mut ImageContext, opts: ResizeOptions) -> Result<()> {
        let src = (ctx.image.width(), ctx.image.height());
        let plan = opts.plan(src);

        let enlarges = plan.scaled.0 > src.0 || plan.scaled.1 > src.1;
        if opts.limit && enlarges {
            tracing::debug!("Skipping resize of {src:?} to {:?}: would enlarge", plan.scaled);
            return Ok(());
        }
        plan.check_bounds()?;

        let mode = opts.mode;
        let color = opts.color;
        ctx.image
            .map(move |img| {
                Ok(match mode {
                    ResizeMode::Fixed => img.resize_exact(plan.scaled.0, plan.scaled.1, FilterType::Lanczos3),
                    ResizeMode::Fill => img.resize_to_fill(plan.canvas.0, plan.canvas.1, FilterType::Lanczos3),
                    ResizeMode::Pad => {
                        let inner = img.resize_exact(plan.scaled.0, plan.scaled.1, FilterType::Lanczos3);
                        pad(&inner, plan.canvas, color)
                    }
                    ResizeMode::Lfit | ResizeMode::Mfit => {
                        img.resize_exact(plan.scaled.0, plan.scaled.1, FilterType::Lanczos3)
                    }
                })
            })
            .await
    }
}

fn pad(inner: &DynamicImage, canvas: (u32, u32), [r, g, b]: [u8; 3]) -> DynamicImage {
    let mut out = RgbaImage::from_pixel(canvas.0, canvas.1, Rgba([r, g, b, 255]));
    let x = (i64::from(canvas.0) - i64::from(inner.width())) / 2;
    let y = (i64::from(canvas.1) - i64::from(inner.height())) / 2;
    image::imageops::overlay(&mut out, &inner.to_rgba8(), x, y);
    DynamicImage::ImageRgba8(out)
}
