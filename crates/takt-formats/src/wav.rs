//! WAV encoding and decoding for PCM audio.

use crate::FormatError;
use std::io::Write;
use takt_engine::{ClickSample, Frame};

// --- Writing ---

pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    let num_channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = frames.len() as u32 * block_align as u32;

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, frames, data_size)
}

pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    write_wav(&mut buf, frames, sample_rate).expect("Vec<u8> write cannot fail");
    buf
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&(36 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&(sample_rate * block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(
    w: &mut impl Write,
    frames: &[Frame],
    data_size: u32,
) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for frame in frames {
        w.write_all(&frame.left.to_le_bytes())?;
        w.write_all(&frame.right.to_le_bytes())?;
    }
    Ok(())
}

// --- Reading ---

/// Load a WAV file from raw bytes into a mono click sample.
///
/// Stereo input is mixed down; 8-bit input is widened to 16-bit.
pub fn load_wav(data: &[u8]) -> Result<ClickSample, FormatError> {
    let header = parse_header(data)?;
    let samples = read_pcm_data(data, &header);
    Ok(ClickSample {
        rate: header.sample_rate,
        data: samples,
    })
}

struct WavHeader {
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 44 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;

        if chunk_id == b"fmt " && chunk_size >= 16 {
            let format = read_u16_le(data, pos + 8);
            if format != 1 {
                return Err(FormatError::Unsupported);
            }
            let channels = read_u16_le(data, pos + 10);
            let rate = read_u32_le(data, pos + 12);
            let bits = read_u16_le(data, pos + 22);
            fmt = Some((channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((pos + 8, chunk_size));
        }

        pos += 8 + chunk_size;
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (num_channels, sample_rate, bits_per_sample) = fmt.ok_or(FormatError::InvalidHeader)?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::InvalidHeader)?;

    if bits_per_sample != 8 && bits_per_sample != 16 {
        return Err(FormatError::Unsupported);
    }
    if !(1..=2).contains(&num_channels) {
        return Err(FormatError::Unsupported);
    }

    Ok(WavHeader { num_channels, sample_rate, bits_per_sample, data_offset, data_size })
}

/// Decode PCM to mono i16, mixing stereo pairs and widening 8-bit input.
fn read_pcm_data(data: &[u8], header: &WavHeader) -> Vec<i16> {
    let end = (header.data_offset + header.data_size).min(data.len());
    let raw = &data[header.data_offset..end];

    match (header.bits_per_sample, header.num_channels) {
        (8, 1) => raw.iter().map(|&b| widen_8bit(b)).collect(),
        (8, 2) => raw
            .chunks_exact(2)
            .map(|c| mix_to_mono(widen_8bit(c[0]), widen_8bit(c[1])))
            .collect(),
        (16, 1) => raw
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect(),
        (16, 2) => raw
            .chunks_exact(4)
            .map(|c| {
                mix_to_mono(
                    i16::from_le_bytes([c[0], c[1]]),
                    i16::from_le_bytes([c[2], c[3]]),
                )
            })
            .collect(),
        // parse_header already rejected everything else
        _ => Vec::new(),
    }
}

/// WAV 8-bit PCM is unsigned with center 128; widen to signed 16-bit.
fn widen_8bit(b: u8) -> i16 {
    ((b as i16 - 128) as i8 as i16) << 8
}

fn mix_to_mono(left: i16, right: i16) -> i16 {
    ((left as i32 + right as i32) / 2) as i16
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal valid WAV file from raw parameters.
    fn make_wav(channels: u16, sample_rate: u32, bits: u16, pcm_data: &[u8]) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = sample_rate * block_align as u32;
        let data_size = pcm_data.len() as u32;
        let file_size = 36 + data_size;

        let mut buf = Vec::new();
        buf.extend(b"RIFF");
        buf.extend(&file_size.to_le_bytes());
        buf.extend(b"WAVE");
        buf.extend(b"fmt ");
        buf.extend(&16u32.to_le_bytes());
        buf.extend(&1u16.to_le_bytes());
        buf.extend(&channels.to_le_bytes());
        buf.extend(&sample_rate.to_le_bytes());
        buf.extend(&byte_rate.to_le_bytes());
        buf.extend(&block_align.to_le_bytes());
        buf.extend(&bits.to_le_bytes());
        buf.extend(b"data");
        buf.extend(&data_size.to_le_bytes());
        buf.extend(pcm_data);
        buf
    }

    #[test]
    fn load_8bit_mono() {
        let wav = make_wav(1, 22050, 8, &[128, 255, 0, 192]);
        let sample = load_wav(&wav).unwrap();
        assert_eq!(sample.rate, 22050);
        assert_eq!(sample.data, vec![0, 127 << 8, -128 << 8, 64 << 8]);
    }

    #[test]
    fn load_16bit_mono() {
        let pcm: Vec<u8> = [0i16, 1000, -1000, 32767]
            .iter()
            .flat_map(|&v| v.to_le_bytes())
            .collect();
        let wav = make_wav(1, 44100, 16, &pcm);
        let sample = load_wav(&wav).unwrap();
        assert_eq!(sample.rate, 44100);
        assert_eq!(sample.data, vec![0, 1000, -1000, 32767]);
    }

    #[test]
    fn load_16bit_stereo_mixes_to_mono() {
        let pcm: Vec<u8> = [100i16, 200, -100, -200]
            .iter()
            .flat_map(|&v| v.to_le_bytes())
            .collect();
        let wav = make_wav(2, 44100, 16, &pcm);
        let sample = load_wav(&wav).unwrap();
        assert_eq!(sample.data, vec![150, -150]);
    }

    #[test]
    fn invalid_header_rejected() {
        assert!(load_wav(b"not a wav").is_err());
    }

    #[test]
    fn too_short_rejected() {
        assert!(load_wav(&[0; 10]).is_err());
    }

    #[test]
    fn non_pcm_encoding_rejected() {
        let mut wav = make_wav(1, 44100, 16, &[0, 0]);
        // Patch the audio format field to 3 (IEEE float)
        wav[20] = 3;
        assert!(matches!(load_wav(&wav), Err(FormatError::Unsupported)));
    }

    #[test]
    fn write_then_load_round_trips() {
        let frames = vec![Frame::mono(0), Frame::mono(5000), Frame::mono(-5000)];
        let wav = frames_to_wav(&frames, 48000);
        let sample = load_wav(&wav).unwrap();
        assert_eq!(sample.rate, 48000);
        assert_eq!(sample.data, vec![0, 5000, -5000]);
    }
}
