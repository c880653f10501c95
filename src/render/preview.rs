//! CPU preview of the particle scene on top of `vello_cpu`.
//!
//! Draw order: opaque black, the cycle-tinted backdrop, background dust, particles and finally
//! the black cover. Dust and particles are composited additively, so overlapping billboards
//! brighten instead of occluding each other and draw order among them does not matter.
//!
//! Each particle samples its own atlas cell, multiplied by the particle tint. Tinted cells are
//! cached per quantized color.

use std::collections::HashMap;
use std::sync::Arc;

use vello_cpu::peniko::color::PremulRgba8;
use vello_cpu::peniko::{BlendMode, Color, Compose, ImageSampler, Mix};

use crate::assets::atlas::{Atlas, AtlasCell};
use crate::choreo::world::World;
use crate::foundation::core::{Affine, Vec3};
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::render::frame::FrameRGBA;
use crate::render::projection::ViewProjection;

/// Preview render settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewOpts {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Particle billboard side, world units.
    pub particle_size: f64,
    /// Particle opacity. Untextured particles are further scaled by their glyph weight.
    pub particle_alpha: f64,
    /// Dust point side, world units.
    pub dust_size: f64,
    /// Dust gray level.
    pub dust_level: u8,
    /// Opacity of the tinted backdrop over black.
    pub backdrop_strength: f64,
    /// Billboards smaller than this many pixels are skipped.
    pub min_px: f64,
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            particle_size: 40.0,
            particle_alpha: 0.85,
            dust_size: 30.0,
            dust_level: 0x44,
            backdrop_strength: 0.35,
            min_px: 0.35,
        }
    }
}

impl PreviewOpts {
    /// Check the viewport fits a `vello_cpu` surface and the sizes are sane.
    pub fn validate(&self) -> SwarmResult<()> {
        let max = u32::from(u16::MAX);
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(SwarmError::validation(format!(
                "preview size must be within 1..={max}, got {}x{}",
                self.width, self.height
            )));
        }
        let sizes = [
            self.particle_size,
            self.particle_alpha,
            self.dust_size,
            self.backdrop_strength,
            self.min_px,
        ];
        if sizes.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SwarmError::validation(
                "preview sizes and opacities must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

const TINTED_CELL_LIMIT: usize = 4096;

/// Atlas cells premultiplied by a tint, for the atlas they were cut from.
#[derive(Default)]
struct TintedCells {
    atlas: Option<Arc<Atlas>>,
    images: HashMap<(AtlasCell, [u8; 4]), vello_cpu::Image>,
}

impl TintedCells {
    fn get(
        &mut self,
        atlas: &Arc<Atlas>,
        cell: AtlasCell,
        color: [u8; 4],
    ) -> SwarmResult<vello_cpu::Image> {
        if !self.atlas.as_ref().is_some_and(|a| Arc::ptr_eq(a, atlas)) {
            self.images.clear();
            self.atlas = Some(Arc::clone(atlas));
        }
        // 5 bits per color channel.
        let key = (
            cell,
            [color[0] & 0xF8, color[1] & 0xF8, color[2] & 0xF8, color[3]],
        );
        if let Some(image) = self.images.get(&key) {
            return Ok(image.clone());
        }
        if self.images.len() >= TINTED_CELL_LIMIT {
            tracing::debug!(cached = self.images.len(), "dropping tinted atlas cells");
            self.images.clear();
        }
        let image = tinted_cell(atlas, key.0, key.1)?;
        self.images.insert(key, image.clone());
        Ok(image)
    }
}

fn mul_u8(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

/// Cut `cell` out of the atlas and multiply its ink by the straight RGBA `color`.
fn tinted_cell(atlas: &Atlas, cell: AtlasCell, color: [u8; 4]) -> SwarmResult<vello_cpu::Image> {
    let n = atlas.matrix_len();
    if cell.col >= n || cell.row >= n {
        return Err(SwarmError::render(format!(
            "atlas cell ({}, {}) outside a {n}x{n} atlas",
            cell.col, cell.row
        )));
    }
    let c = atlas.cell_px();
    let side: u16 = c
        .try_into()
        .map_err(|_| SwarmError::render("atlas cell exceeds u16"))?;
    let frame = atlas.frame();
    let uv = atlas.uv_region(cell);
    let x0 = (uv.x0 * f64::from(frame.width)).round() as usize;
    let y0 = (uv.y0 * f64::from(frame.height)).round() as usize;
    let stride = frame.width as usize;

    let mut pixels = Vec::<PremulRgba8>::with_capacity((c as usize) * (c as usize));
    for y in y0..y0 + c as usize {
        for x in x0..x0 + c as usize {
            let ink = frame.data.get((y * stride + x) * 4 + 3).copied().unwrap_or(0);
            let a = mul_u8(ink, color[3]);
            pixels.push(PremulRgba8::from_u8_array([
                mul_u8(color[0], a),
                mul_u8(color[1], a),
                mul_u8(color[2], a),
                a,
            ]));
        }
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, side, side, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: ImageSampler::default(),
    })
}

enum Fill {
    Solid(Color),
    /// Square image `px` pixels on a side.
    Texture { image: vello_cpu::Image, px: f64 },
}

/// Stateful preview renderer; keeps its `vello_cpu` context and tinted atlas cells between
/// frames.
pub struct PreviewRenderer {
    opts: PreviewOpts,
    ctx: Option<vello_cpu::RenderContext>,
    tinted: TintedCells,
}

impl std::fmt::Debug for PreviewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewRenderer")
            .field("opts", &self.opts)
            .field("tinted_cells", &self.tinted.images.len())
            .finish_non_exhaustive()
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rgba(c: [u8; 4]) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}

fn unit_alpha(a: f64) -> u8 {
    (a.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl PreviewRenderer {
    /// Renderer for `opts`.
    pub fn new(opts: PreviewOpts) -> SwarmResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            ctx: None,
            tinted: TintedCells::default(),
        })
    }

    /// Settings in use.
    pub fn opts(&self) -> &PreviewOpts {
        &self.opts
    }

    /// Draw `world` as seen from its camera.
    pub fn render(&mut self, world: &World) -> SwarmResult<FrameRGBA> {
        let (w, h) = (self.opts.width as u16, self.opts.height as u16);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let drawn = self.draw(&mut ctx, world)?;

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        tracing::trace!(drawn, "preview frame rendered");
        FrameRGBA::from_premul(
            self.opts.width,
            self.opts.height,
            pixmap.data_as_u8_slice().to_vec(),
        )
    }

    fn draw(&mut self, ctx: &mut vello_cpu::RenderContext, world: &World) -> SwarmResult<usize> {
        let (w, h) = (f64::from(self.opts.width), f64::from(self.opts.height));
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_blend_mode(BlendMode::default());
        ctx.set_paint(Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_rect(&full);
        ctx.set_paint(rgba(
            world
                .backdrop
                .to_rgba8(self.opts.backdrop_strength.clamp(0.0, 1.0)),
        ));
        ctx.fill_rect(&full);

        let view = ViewProjection::look_at_origin(&world.camera, self.opts.width, self.opts.height);
        ctx.set_blend_mode(BlendMode::new(Mix::Normal, Compose::Plus));

        let level = self.opts.dust_level;
        let dust_paint = Color::from_rgba8(level, level, level, 255);
        let mut drawn = 0usize;
        for p in &world.dust {
            let fill = Fill::Solid(dust_paint);
            if self.billboard(ctx, &view, *p, 0.0, self.opts.dust_size, fill) {
                drawn += 1;
            }
        }

        let size = self.opts.particle_size;
        for slot in world.pool.iter().filter(|s| s.visible) {
            let fill = match &world.atlas {
                Some(atlas) => {
                    let alpha = unit_alpha(self.opts.particle_alpha);
                    if alpha == 0 {
                        continue;
                    }
                    let color = slot.tint.to_rgba8(f64::from(alpha) / 255.0);
                    Fill::Texture {
                        image: self.tinted.get(atlas, slot.atlas_cell, color)?,
                        px: f64::from(atlas.cell_px()),
                    }
                }
                None => {
                    let weight = world.glyph_weight(slot.atlas_cell.col, slot.atlas_cell.row);
                    let alpha = unit_alpha(self.opts.particle_alpha * weight);
                    if alpha == 0 {
                        continue;
                    }
                    Fill::Solid(rgba(slot.tint.to_rgba8(f64::from(alpha) / 255.0)))
                }
            };
            let pos = slot.position + world.swarm_offset;
            if self.billboard(ctx, &view, pos, slot.rotation.z, size, fill) {
                drawn += 1;
            }
        }

        let cover = unit_alpha(world.cover_opacity);
        if cover > 0 {
            ctx.set_blend_mode(BlendMode::default());
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(Color::from_rgba8(0, 0, 0, cover));
            ctx.fill_rect(&full);
        }
        Ok(drawn)
    }

    /// Draw one screen-aligned square. Returns `false` when culled.
    fn billboard(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        view: &ViewProjection,
        pos: Vec3,
        rotation: f64,
        world_size: f64,
        fill: Fill,
    ) -> bool {
        let Some(p) = view.project(pos) else {
            return false;
        };
        let side = world_size * p.scale;
        let (w, h) = (f64::from(self.opts.width), f64::from(self.opts.height));
        if side < self.opts.min_px || side > 4.0 * w.max(h) {
            return false;
        }
        let half = side / 2.0;
        let reach = half * std::f64::consts::SQRT_2;
        if p.screen.x + reach < 0.0
            || p.screen.y + reach < 0.0
            || p.screen.x - reach > w
            || p.screen.y - reach > h
        {
            return false;
        }

        let tr = Affine::translate((p.screen.x, p.screen.y)) * Affine::rotate(-rotation);
        match fill {
            Fill::Solid(paint) => {
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-half, -half, half, half));
            }
            Fill::Texture { image, px } => {
                // Image pixel (0, 0) lands on the quad's corner; the transform scales cell
                // pixels to screen pixels.
                let c = px / 2.0;
                ctx.set_transform(affine_to_cpu(tr * Affine::scale(side / px)));
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::translate((-c, -c)));
                ctx.set_paint(image);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-c, -c, c, c));
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
