//! Bitmap files and their cache records on a filesystem
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::bitmap::{swap_pairs, BitmapHeader, CacheHeader, BITMAP_HEADER_LEN};
use crate::color::Color;
use crate::driver::Ili9341;
use crate::error::Error;
use crate::interface::PixelBus;

/// File extension of cache records
pub const CACHE_EXTENSION: &str = "cache";

/// Bytes staged per write while building a cache record
const CACHE_CHUNK_BYTES: usize = 512;

/// Where bitmaps and their cache records live
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    /// Directory holding the source bitmaps
    pub image_dir: PathBuf,
    /// Directory holding `<name>.cache` records
    pub cache_dir: PathBuf,
}

impl ImageConfig {
    /// Bitmaps in `image_dir`, cache records in its `cache` subdirectory
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        let image_dir = image_dir.into();
        let cache_dir = image_dir.join(CACHE_EXTENSION);
        Self {
            image_dir,
            cache_dir,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self::new("images")
    }
}

/// Bytes of a reader, with the first read error kept aside
struct ByteSource<R> {
    bytes: io::Bytes<R>,
    error: Option<io::Error>,
}

impl<R: Read> ByteSource<R> {
    fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            error: None,
        }
    }

    /// Prefer the read error over whatever the consumer made of the early end
    fn finish(self, result: Result<(), Error>) -> Result<(), Error> {
        match self.error {
            Some(err) => Err(Error::Io(err)),
            None => result,
        }
    }
}

impl<R: Read> Iterator for ByteSource<R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match self.bytes.next()? {
            Ok(byte) => Some(byte),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

fn read_bitmap_header<R: Read>(reader: &mut R) -> Result<BitmapHeader, Error> {
    let mut head = Vec::with_capacity(BITMAP_HEADER_LEN);
    reader
        .take(BITMAP_HEADER_LEN as u64)
        .read_to_end(&mut head)?;
    BitmapHeader::parse(&head)
}

/// Check the image fits, then paint the background
fn prepare_frame<B, RST, BL>(
    display: &mut Ili9341<B, RST, BL>,
    size: (u16, u16),
    pos: Option<(u16, u16)>,
    background: Option<Color>,
) -> Result<(), Error>
where
    B: PixelBus,
    RST: OutputPin,
    BL: OutputPin,
{
    display.image_window(size.0, size.1, pos)?;
    match background {
        Some(color) => display.fill_screen(color, 0),
        None => Ok(()),
    }
}

/// Renders and caches the bitmaps of an [`ImageConfig`]
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    config: ImageConfig,
}

impl ImageStore {
    /// Create a store over the given directories
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// The directories in use
    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Path of the cache record for the bitmap `name`
    pub fn cache_path(&self, name: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{name}.{CACHE_EXTENSION}"))
    }

    /// Whether a cache record exists for `name`
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache_path(name).is_file()
    }

    /// Draw the bitmap `name`
    ///
    /// The cache record is used when `cached` is set and a record exists,
    /// the source bitmap otherwise. Once the header has been read and the
    /// image is known to fit, the frame is filled with `background` when
    /// given. `pos` of `None` centers the image.
    pub fn render_bmp<B, RST, BL>(
        &self,
        display: &mut Ili9341<B, RST, BL>,
        name: &str,
        pos: Option<(u16, u16)>,
        cached: bool,
        background: Option<Color>,
    ) -> Result<(), Error>
    where
        B: PixelBus,
        RST: OutputPin,
        BL: OutputPin,
    {
        if cached && self.is_cached(name) {
            debug!("rendering {} from cache", name);
            let mut reader = BufReader::new(File::open(self.cache_path(name))?);
            let mut head = [0u8; CacheHeader::LEN];
            reader.read_exact(&mut head)?;
            let header = CacheHeader::parse(&head)?;
            prepare_frame(display, (header.width, header.height), pos, background)?;
            let mut source = ByteSource::new(reader);
            let result = display.draw_cached(&header, &mut source, pos);
            return source.finish(result);
        }

        debug!("rendering {} from bitmap", name);
        let mut reader = BufReader::new(File::open(self.config.image_dir.join(name))?);
        let header = read_bitmap_header(&mut reader)?;
        reader.seek(SeekFrom::Start(u64::from(header.pixel_offset)))?;
        prepare_frame(display, (header.width, header.height), pos, background)?;
        let mut source = ByteSource::new(reader);
        let result = display.draw_bmp(&header, &mut source, pos);
        source.finish(result)
    }

    /// Write the cache record for the bitmap `name`, replacing any old one
    pub fn cache_image(&self, name: &str) -> Result<CacheHeader, Error> {
        let mut reader = BufReader::new(File::open(self.config.image_dir.join(name))?);
        let bitmap = read_bitmap_header(&mut reader)?;
        reader.seek(SeekFrom::Start(u64::from(bitmap.pixel_offset)))?;

        fs::create_dir_all(&self.config.cache_dir)?;
        let header = CacheHeader::from(bitmap);
        let mut writer = BufWriter::new(File::create(self.cache_path(name))?);
        writer.write_all(&header.encode())?;

        let mut source = ByteSource::new(reader);
        let mut pixels = swap_pairs(&mut source);
        let mut chunk = [0u8; CACHE_CHUNK_BYTES];
        loop {
            let mut len = 0;
            for (slot, byte) in chunk.iter_mut().zip(pixels.by_ref()) {
                *slot = byte;
                len += 1;
            }
            if len == 0 {
                break;
            }
            writer.write_all(&chunk[..len])?;
        }
        source.finish(Ok(()))?;
        writer.flush()?;

        debug!("cached {} ({}x{})", name, header.width, header.height);
        Ok(header)
    }

    /// Cache every bitmap in the image directory
    ///
    /// Files that are not bitmaps are skipped. Returns the number of records
    /// written.
    pub fn cache_all_images(&self) -> Result<usize, Error> {
        fs::create_dir_all(&self.config.cache_dir)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.image_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();

        let mut cached = 0;
        for name in &names {
            match self.cache_image(name) {
                Ok(_) => cached += 1,
                Err(Error::InvalidBitmapFormat) => debug!("skipping {}: not a bitmap", name),
                Err(err) => return Err(err),
            }
        }
        Ok(cached)
    }

    /// Delete every cache record; returns how many were removed
    pub fn clear_image_cache(&self) -> Result<usize, Error> {
        if !self.config.cache_dir.is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.config.cache_dir)? {
            let path = entry?.path();
            if path.is_file() && is_cache_record(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        debug!("removed {} cache records", removed);
        Ok(removed)
    }
}

fn is_cache_record(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CACHE_EXTENSION)
}
