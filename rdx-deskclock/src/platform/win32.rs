//! `PlatformWindow` for a real layered `HWND`.
//!
//! The host owns the window procedure. It creates the window, forwards mouse
//! and sizing messages to the engine as `InputEvent`s, and paints the last
//! [`Scene`] from [`Win32Window::scene`] on `WM_PAINT`.

use super::{ExtendedStyle, PlatformWindow, Scene};
use crate::common::{Point, Rgb, Size};
use anyhow::{bail, Context};
use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::InvalidateRect;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, GetClientRect, GetWindowLongPtrW, GetWindowRect, SetLayeredWindowAttributes,
    SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE, GWL_STYLE, HWND_NOTOPMOST, HWND_TOPMOST, LWA_ALPHA,
    LWA_COLORKEY, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WINDOW_EX_STYLE, WINDOW_STYLE,
};

pub struct Win32Window {
    hwnd: HWND,
    /// `SetLayeredWindowAttributes` sets alpha and key together, so both are
    /// remembered here.
    opacity: f64,
    color_key: Option<Rgb>,
    background: Rgb,
    scene: Option<Scene>,
}

impl Win32Window {
    /// Wraps a window created by the host.
    pub fn new(hwnd: HWND) -> anyhow::Result<Self> {
        if hwnd.is_invalid() {
            bail!("invalid window handle");
        }
        Ok(Self {
            hwnd,
            opacity: 1.0,
            color_key: None,
            background: Rgb::BLACK,
            scene: None,
        })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// The last scene handed to `present`, for the host's paint routine.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The fill the host paints behind the labels.
    pub fn background(&self) -> Rgb {
        self.background
    }

    fn apply_layered_attributes(&mut self) -> anyhow::Result<()> {
        let current = self.extended_style()?;
        if !current.contains(ExtendedStyle::LAYERED) {
            self.set_extended_style(current | ExtendedStyle::LAYERED)?;
        }
        let alpha = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (key, flags) = match self.color_key {
            Some(key) => (colorref(key), LWA_ALPHA | LWA_COLORKEY),
            None => (COLORREF(0), LWA_ALPHA),
        };
        unsafe { SetLayeredWindowAttributes(self.hwnd, key, alpha, flags) }
            .context("SetLayeredWindowAttributes failed")
    }

    fn window_rect(&self) -> anyhow::Result<RECT> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(self.hwnd, &mut rect) }.context("GetWindowRect failed")?;
        Ok(rect)
    }
}

impl PlatformWindow for Win32Window {
    fn extended_style(&self) -> anyhow::Result<ExtendedStyle> {
        let bits = unsafe { GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) };
        Ok(ExtendedStyle(bits as u32))
    }

    fn set_extended_style(&mut self, style: ExtendedStyle) -> anyhow::Result<()> {
        unsafe { SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, style.bits() as isize) };
        // SetWindowLongPtrW reports failure ambiguously; read the bits back.
        let written = self.extended_style()?;
        if written != style {
            bail!("extended style is {:?} after writing {:?}", written, style);
        }
        Ok(())
    }

    fn set_color_key(&mut self, key: Option<Rgb>) -> anyhow::Result<()> {
        self.color_key = key;
        self.apply_layered_attributes()
    }

    fn set_background(&mut self, color: Rgb) -> anyhow::Result<()> {
        self.background = color;
        let _ = unsafe { InvalidateRect(self.hwnd, None, true) };
        Ok(())
    }

    fn set_opacity(&mut self, fraction: f64) -> anyhow::Result<()> {
        self.opacity = fraction;
        self.apply_layered_attributes()
    }

    fn set_topmost(&mut self, topmost: bool) -> anyhow::Result<()> {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        unsafe {
            SetWindowPos(
                self.hwnd,
                insert_after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            )
        }
        .context("SetWindowPos (z-order) failed")
    }

    fn client_size(&self) -> Size {
        let mut rect = RECT::default();
        match unsafe { GetClientRect(self.hwnd, &mut rect) } {
            Ok(()) => Size::new(rect.right - rect.left, rect.bottom - rect.top),
            Err(e) => {
                tracing::warn!("GetClientRect failed: {}", e);
                Size::default()
            }
        }
    }

    fn set_client_size(&mut self, size: Size) -> anyhow::Result<()> {
        let style = unsafe { GetWindowLongPtrW(self.hwnd, GWL_STYLE) } as u32;
        let ex_style = self.extended_style()?.bits();
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: size.width,
            bottom: size.height,
        };
        unsafe { AdjustWindowRectEx(&mut rect, WINDOW_STYLE(style), false, WINDOW_EX_STYLE(ex_style)) }
            .context("AdjustWindowRectEx failed")?;
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                0,
                0,
                rect.right - rect.left,
                rect.bottom - rect.top,
                SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .context("SetWindowPos (size) failed")
    }

    fn position(&self) -> Point {
        match self.window_rect() {
            Ok(rect) => Point::new(rect.left, rect.top),
            Err(e) => {
                tracing::warn!("{:#}", e);
                Point::default()
            }
        }
    }

    fn set_position(&mut self, position: Point) -> anyhow::Result<()> {
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND::default(),
                position.x,
                position.y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            )
        }
        .context("SetWindowPos (move) failed")
    }

    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.scene = Some(scene.clone());
        let _ = unsafe { InvalidateRect(self.hwnd, None, false) };
        Ok(())
    }
}

/// GDI colors are laid out `0x00BBGGRR`.
fn colorref(color: Rgb) -> COLORREF {
    COLORREF(u32::from(color.r) | (u32::from(color.g) << 8) | (u32::from(color.b) << 16))
}
