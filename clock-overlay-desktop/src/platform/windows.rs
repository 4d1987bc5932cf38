use std::error::Error;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{io, mem, ptr};

use clock_overlay::Point;
use image::RgbaImage;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
use windows_sys::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, GetDIBits, GetObjectW,
    ReleaseDC, SelectObject, AC_SRC_ALPHA, AC_SRC_OVER, BITMAP, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
};
use windows_sys::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CopyIcon, DestroyIcon, GetCursorPos, GetIconInfo, LoadIconW, UpdateLayeredWindow,
    GWL_EXSTYLE, HICON, ICONINFO, IDI_APPLICATION, SPI_SETWORKAREA, ULW_ALPHA, WM_DISPLAYCHANGE,
    WM_SETTINGCHANGE, WS_EX_APPWINDOW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TRANSPARENT,
};
use winit::window::Window;

#[cfg(target_pointer_width = "64")]
use windows_sys::Win32::UI::WindowsAndMessaging::{GetWindowLongPtrW, SetWindowLongPtrW};
#[cfg(target_pointer_width = "32")]
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetWindowLongW as GetWindowLongPtrW, SetWindowLongW as SetWindowLongPtrW,
};

/// Layered tool window painted from RGBA frames.
pub struct Surface {
    hwnd: HWND,
    click_through: bool,
}

impl Surface {
    pub fn attach(window: &Window) -> Result<Self, Box<dyn Error>> {
        let hwnd = hwnd_of(window)?;
        let surface = Self {
            hwnd,
            click_through: false,
        };
        surface.restyle(window);
        Ok(surface)
    }

    /// Reapply the extended styles. winit rewrites them on some state changes.
    pub fn restyle(&self, _window: &Window) {
        unsafe {
            let current = GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) as u32;
            let mut style = (current | WS_EX_LAYERED | WS_EX_TOOLWINDOW) & !WS_EX_APPWINDOW;
            if self.click_through {
                style |= WS_EX_TRANSPARENT;
            } else {
                style &= !WS_EX_TRANSPARENT;
            }
            if style != current {
                SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, style as _);
            }
        }
    }

    pub fn set_click_through(&mut self, window: &Window, enabled: bool) {
        self.click_through = enabled;
        self.restyle(window);
    }

    /// Paint `frame` with per-pixel alpha and resize the window to it.
    pub fn present(&mut self, window: &Window, frame: &RgbaImage) -> io::Result<()> {
        if let Err(err) = self.update_layered(frame) {
            log::debug!("Layered update failed ({}), restyling", err);
            self.restyle(window);
            return self.update_layered(frame);
        }
        Ok(())
    }

    fn update_layered(&self, frame: &RgbaImage) -> io::Result<()> {
        let (width, height) = frame.dimensions();
        let pixels = super::premultiplied_bgra(frame);

        unsafe {
            let screen = ScreenDc::get()?;
            let memory = MemoryDc::compatible(&screen)?;

            let info = bitmap_info(width as i32, height as i32);
            let mut bits: *mut c_void = ptr::null_mut();
            let bitmap = GdiObject::new(CreateDIBSection(
                screen.0,
                &info,
                DIB_RGB_COLORS,
                &mut bits,
                0,
                0,
            ))?;
            if bits.is_null() {
                return Err(io::Error::last_os_error());
            }
            ptr::copy_nonoverlapping(pixels.as_ptr(), bits.cast::<u8>(), pixels.len());
            let _selection = Selection::new(&memory, &bitmap);

            let size = SIZE {
                cx: width as i32,
                cy: height as i32,
            };
            let origin = POINT { x: 0, y: 0 };
            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                BlendFlags: 0,
                SourceConstantAlpha: 0xFF,
                AlphaFormat: AC_SRC_ALPHA as u8,
            };
            let updated = UpdateLayeredWindow(
                self.hwnd,
                screen.0,
                ptr::null(),
                &size,
                memory.0,
                &origin,
                0,
                &blend,
                ULW_ALPHA,
            );
            if updated == 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

// Set from the window procedure, drained by the event loop.
static DISPLAY_CHANGED: AtomicBool = AtomicBool::new(false);

const DISPLAY_SUBCLASS_ID: usize = 1;

/// Subscription to display-configuration messages sent to the overlay window.
///
/// The subclass is removed on drop.
pub struct DisplayWatch {
    hwnd: HWND,
}

impl DisplayWatch {
    pub fn attach(window: &Window) -> Result<Self, Box<dyn Error>> {
        let hwnd = hwnd_of(window)?;
        let installed =
            unsafe { SetWindowSubclass(hwnd, Some(display_subclass), DISPLAY_SUBCLASS_ID, 0) };
        if installed == 0 {
            return Err(io::Error::last_os_error().into());
        }
        log::debug!("Listening for display changes");
        Ok(Self { hwnd })
    }

    /// Whether a display change arrived since the last call.
    pub fn take_changed(&mut self, _window: &Window) -> bool {
        DISPLAY_CHANGED.swap(false, Ordering::SeqCst)
    }
}

impl Drop for DisplayWatch {
    fn drop(&mut self) {
        unsafe {
            RemoveWindowSubclass(self.hwnd, Some(display_subclass), DISPLAY_SUBCLASS_ID);
        }
        log::debug!("Stopped listening for display changes");
    }
}

fn is_display_change(message: u32, wparam: WPARAM) -> bool {
    match message {
        WM_DISPLAYCHANGE => true,
        WM_SETTINGCHANGE => wparam == SPI_SETWORKAREA as WPARAM,
        _ => false,
    }
}

unsafe extern "system" fn display_subclass(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _id: usize,
    _data: usize,
) -> LRESULT {
    if is_display_change(message, wparam) {
        DISPLAY_CHANGED.store(true, Ordering::SeqCst);
    }
    DefSubclassProc(hwnd, message, wparam, lparam)
}

/// Absolute cursor position in screen pixels.
pub fn cursor_position() -> Option<Point> {
    let mut point = POINT { x: 0, y: 0 };
    if unsafe { GetCursorPos(&mut point) } == 0 {
        log::debug!("Cursor position unavailable: {}", io::Error::last_os_error());
        return None;
    }
    Some(Point::new(point.x, point.y))
}

fn hwnd_of(window: &Window) -> Result<HWND, Box<dyn Error>> {
    match window.window_handle()?.as_raw() {
        RawWindowHandle::Win32(handle) => Ok(handle.hwnd.get()),
        other => Err(format!("unexpected window handle {:?}", other).into()),
    }
}

/// The stock application icon as RGBA, read from a private copy of the handle.
pub fn system_application_icon() -> Option<RgbaImage> {
    let icon = unsafe {
        let shared = LoadIconW(0, IDI_APPLICATION);
        if shared == 0 {
            log::warn!("System application icon unavailable");
            return None;
        }
        OwnedIcon::copy(shared)?
    };
    match icon.to_rgba() {
        Ok(image) => image,
        Err(err) => {
            log::warn!("Reading system application icon failed: {}", err);
            None
        }
    }
}

fn bitmap_info(width: i32, height: i32) -> BITMAPINFO {
    let mut info: BITMAPINFO = unsafe { mem::zeroed() };
    info.bmiHeader.biSize = mem::size_of::<BITMAPINFOHEADER>() as u32;
    info.bmiHeader.biWidth = width;
    // Negative height selects a top-down layout.
    info.bmiHeader.biHeight = -height;
    info.bmiHeader.biPlanes = 1;
    info.bmiHeader.biBitCount = 32;
    info.bmiHeader.biCompression = BI_RGB as _;
    info
}

struct ScreenDc(HDC);

impl ScreenDc {
    unsafe fn get() -> io::Result<Self> {
        match GetDC(0) {
            0 => Err(io::Error::last_os_error()),
            dc => Ok(Self(dc)),
        }
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(0, self.0);
        }
    }
}

struct MemoryDc(HDC);

impl MemoryDc {
    unsafe fn compatible(screen: &ScreenDc) -> io::Result<Self> {
        match CreateCompatibleDC(screen.0) {
            0 => Err(io::Error::last_os_error()),
            dc => Ok(Self(dc)),
        }
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            DeleteDC(self.0);
        }
    }
}

struct GdiObject(HGDIOBJ);

impl GdiObject {
    fn new(handle: HBITMAP) -> io::Result<Self> {
        match handle {
            0 => Err(io::Error::last_os_error()),
            handle => Ok(Self(handle)),
        }
    }

    /// Wraps a handle that may be null, as icon info returns for absent bitmaps.
    fn optional(handle: HBITMAP) -> Option<Self> {
        (handle != 0).then_some(Self(handle))
    }
}

impl Drop for GdiObject {
    fn drop(&mut self) {
        unsafe {
            DeleteObject(self.0);
        }
    }
}

/// Keeps an object selected into a DC and restores the previous one on drop.
struct Selection<'a> {
    dc: &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    unsafe fn new(dc: &'a MemoryDc, object: &GdiObject) -> Self {
        let previous = SelectObject(dc.0, object.0);
        Self { dc, previous }
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc.0, self.previous);
        }
    }
}

struct OwnedIcon(HICON);

impl OwnedIcon {
    unsafe fn copy(shared: HICON) -> Option<Self> {
        match CopyIcon(shared) {
            0 => {
                log::warn!("Copying icon failed: {}", io::Error::last_os_error());
                None
            }
            icon => Some(Self(icon)),
        }
    }

    fn to_rgba(&self) -> io::Result<Option<RgbaImage>> {
        unsafe {
            let mut info: ICONINFO = mem::zeroed();
            if GetIconInfo(self.0, &mut info) == 0 {
                return Err(io::Error::last_os_error());
            }
            let mask = GdiObject::optional(info.hbmMask);
            let Some(color) = GdiObject::optional(info.hbmColor) else {
                log::debug!("Monochrome icon has no color bitmap");
                return Ok(None);
            };

            let mut bitmap: BITMAP = mem::zeroed();
            let read = GetObjectW(
                color.0,
                mem::size_of::<BITMAP>() as i32,
                (&mut bitmap as *mut BITMAP).cast::<c_void>(),
            );
            if read == 0 || bitmap.bmWidth <= 0 || bitmap.bmHeight <= 0 {
                return Err(io::Error::last_os_error());
            }
            let (width, height) = (bitmap.bmWidth, bitmap.bmHeight);

            let screen = ScreenDc::get()?;
            let color_bits = read_bits(&screen, &color, width, height)?;
            let mask_bits = match &mask {
                Some(mask) => read_bits(&screen, mask, width, height).ok(),
                None => None,
            };

            Ok(super::icon_rgba(
                width as u32,
                height as u32,
                &color_bits,
                mask_bits.as_deref(),
            ))
        }
    }
}

impl Drop for OwnedIcon {
    fn drop(&mut self) {
        unsafe {
            DestroyIcon(self.0);
        }
    }
}

unsafe fn read_bits(
    screen: &ScreenDc,
    bitmap: &GdiObject,
    width: i32,
    height: i32,
) -> io::Result<Vec<u8>> {
    let mut info = bitmap_info(width, height);
    let mut bits = vec![0u8; width as usize * height as usize * 4];
    let lines = GetDIBits(
        screen.0,
        bitmap.0,
        0,
        height as u32,
        bits.as_mut_ptr().cast::<c_void>(),
        &mut info,
        DIB_RGB_COLORS,
    );
    if lines == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(bits)
}
