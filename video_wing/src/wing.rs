//! The WinG library and its five entry points.

use crate::gdi::{Bitmap, Dc, RgbQuad};
use hal::loadso::{LoadError, ObjectHandle, SharedObjectLoader, Symbol};

/// WinG runtime library
pub const WING_LIBRARY: &str = "WING32.DLL";

pub const WING_CREATE_DC: &str = "WinGCreateDC";
pub const WING_RECOMMEND_DIB_FORMAT: &str = "WinGRecommendDIBFormat";
pub const WING_CREATE_BITMAP: &str = "WinGCreateBitmap";
pub const WING_GET_DIB_COLOR_TABLE: &str = "WinGGetDIBColorTable";
pub const WING_BIT_BLT: &str = "WinGBitBlt";

/// DIB pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Rgb,
    /// Explicit red, green and blue masks
    Bitfields([u32; 3]),
}

/// The parts of a BITMAPINFOHEADER the driver reads or fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DibHeader {
    pub width: i32,
    /// Negative for top-down bitmaps
    pub height: i32,
    pub bit_count: u16,
    pub compression: Compression,
    pub size_image: u32,
}

impl DibHeader {
    /// 8-bit header used when WinG has no recommendation
    pub fn fallback() -> Self {
        Self {
            width: 0,
            height: 0,
            bit_count: 8,
            compression: Compression::Rgb,
            size_image: 0,
        }
    }
}

/// WinG calls
pub trait WinG: Send {
    fn create_dc(&mut self) -> Option<Dc>;
    fn recommend_dib_format(&mut self) -> Option<DibHeader>;

    /// Creates a DIB section; the bits are reachable through `bits_mut`
    fn create_bitmap(&mut self, dc: Dc, header: &DibHeader) -> Option<Bitmap>;

    /// Bitmap memory handed back by `create_bitmap`
    fn bits_mut(&mut self, bitmap: Bitmap) -> Option<&mut [u8]>;

    fn get_dib_color_table(&mut self, dc: Dc, first: usize, colors: &mut [RgbQuad]) -> usize;

    #[allow(clippy::too_many_arguments)]
    fn bit_blt(
        &mut self,
        dst: Dc,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        src: Dc,
        src_x: i32,
        src_y: i32,
    ) -> bool;
}

/// Addresses of the WinG entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WingEntryPoints {
    pub create_dc: Symbol,
    pub recommend_dib_format: Symbol,
    pub create_bitmap: Symbol,
    pub get_dib_color_table: Symbol,
    pub bit_blt: Symbol,
}

/// A loaded WING32.DLL with every entry point resolved
#[derive(Debug)]
pub struct WingLibrary {
    handle: ObjectHandle,
    entry_points: WingEntryPoints,
}

impl WingLibrary {
    /// Loads the library and resolves all five entry points. A missing
    /// entry point unloads the library again.
    pub fn load(loader: &mut dyn SharedObjectLoader) -> Result<Self, LoadError> {
        let handle = loader.load_object(WING_LIBRARY)?;
        match resolve(loader, handle) {
            Ok(entry_points) => {
                tracing::debug!("WinG entry points resolved");
                Ok(Self {
                    handle,
                    entry_points,
                })
            }
            Err(err) => {
                loader.unload_object(handle);
                Err(err)
            }
        }
    }

    pub fn entry_points(&self) -> &WingEntryPoints {
        &self.entry_points
    }

    pub fn unload(self, loader: &mut dyn SharedObjectLoader) {
        loader.unload_object(self.handle);
    }
}

fn resolve(
    loader: &dyn SharedObjectLoader,
    handle: ObjectHandle,
) -> Result<WingEntryPoints, LoadError> {
    Ok(WingEntryPoints {
        create_dc: loader.load_function(handle, WING_CREATE_DC)?,
        recommend_dib_format: loader.load_function(handle, WING_RECOMMEND_DIB_FORMAT)?,
        create_bitmap: loader.load_function(handle, WING_CREATE_BITMAP)?,
        get_dib_color_table: loader.load_function(handle, WING_GET_DIB_COLOR_TABLE)?,
        bit_blt: loader.load_function(handle, WING_BIT_BLT)?,
    })
}

/// Whether WING32.DLL can be loaded at all
pub fn wing_available(loader: &mut dyn SharedObjectLoader) -> bool {
    match loader.load_object(WING_LIBRARY) {
        Ok(handle) => {
            loader.unload_object(handle);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::loadso::SymbolTableLoader;

    fn full_library() -> SymbolTableLoader {
        SymbolTableLoader::new().with_library(
            WING_LIBRARY,
            &[
                (WING_CREATE_DC, 0x10),
                (WING_RECOMMEND_DIB_FORMAT, 0x20),
                (WING_CREATE_BITMAP, 0x30),
                (WING_GET_DIB_COLOR_TABLE, 0x40),
                (WING_BIT_BLT, 0x50),
            ],
        )
    }

    #[test]
    fn test_load_resolves_all_entry_points() {
        let mut loader = full_library();
        let library = WingLibrary::load(&mut loader).unwrap();
        assert_eq!(library.entry_points().create_dc.addr(), 0x10);
        assert_eq!(library.entry_points().bit_blt.addr(), 0x50);
        assert_eq!(loader.loaded_count(), 1);

        library.unload(&mut loader);
        assert_eq!(loader.loaded_count(), 0);
    }

    #[test]
    fn test_missing_entry_point_unloads() {
        let mut loader = SymbolTableLoader::new()
            .with_library(WING_LIBRARY, &[(WING_CREATE_DC, 0x10)]);
        let err = WingLibrary::load(&mut loader).unwrap_err();
        assert!(err.to_string().contains(WING_RECOMMEND_DIB_FORMAT));
        assert_eq!(loader.loaded_count(), 0);
    }

    #[test]
    fn test_availability() {
        assert!(wing_available(&mut full_library()));
        assert!(!wing_available(&mut SymbolTableLoader::new()));
    }
}
