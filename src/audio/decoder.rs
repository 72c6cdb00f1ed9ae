use crate::audio::error::AudioError;
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace, warn};

const LOG_TARGET: &str = "reflectobot::audio::decoder";

/// Decodes a local audio file into interleaved S16 chunks.
///
/// Blocking: meant to run on a `spawn_blocking` thread next to the ALSA writer.
pub struct FileDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    spec: SignalSpec,
}

impl FileDecoder {
    /// Opens and probes `path`, selecting the first playable track.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(AudioError::UnsupportedFormat("No suitable audio track found".to_string()))?
            .clone();

        let decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let spec = SignalSpec::new(
            track.codec_params.sample_rate.ok_or(AudioError::MissingCodecParams("sample rate"))?,
            track.codec_params.channels.ok_or(AudioError::MissingCodecParams("channels map"))?,
        );
        debug!(target: LOG_TARGET, "Opened {} (track {}, {:?})", path.display(), track.id, spec);

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            spec,
        })
    }

    pub fn spec(&self) -> SignalSpec {
        self.spec
    }

    /// Returns the next decoded chunk as interleaved S16 scaled by `volume`,
    /// or `None` at end of stream. Corrupt packets are skipped.
    pub fn next_chunk(&mut self, volume: f32) -> Result<Option<Vec<i16>>, AudioError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    trace!(target: LOG_TARGET, "End of stream reached.");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    if decoded.spec() != &self.spec {
                        return Err(AudioError::UnsupportedFormat("Dynamic spec change".to_string()));
                    }
                    let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, self.spec);
                    buf.copy_interleaved_ref(decoded);
                    let mut samples = buf.samples().to_vec();
                    apply_volume(&mut samples, volume);
                    return Ok(Some(samples));
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    warn!(target: LOG_TARGET, "Decode error (skipping packet): {}", err);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Scales samples in place by a linear gain clamped to `0.0..=1.0`.
pub fn apply_volume(samples: &mut [i16], volume: f32) {
    let gain = volume.clamp(0.0, 1.0);
    if gain >= 1.0 {
        return;
    }
    for sample in samples.iter_mut() {
        *sample = (*sample as f32 * gain).round() as i16;
    }
}
