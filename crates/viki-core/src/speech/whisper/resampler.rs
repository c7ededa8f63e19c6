use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler from the microphone rate to the model rate.
pub(crate) struct Resampler {
    inner: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::Audio {
            reason: format!("failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            inner,
            input_rate,
            output_rate,
        })
    }

    /// Resample a whole utterance. The tail chunk is zero-padded and the
    /// output trimmed back to the exact rate ratio.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub(crate) fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len = (samples.len() as u64 * u64::from(self.output_rate)
            / u64::from(self.input_rate)) as usize;

        let out_capacity = self.inner.output_frames_max();
        let mut scratch_in = vec![0.0f32; CHUNK_FRAMES];
        let mut scratch_out = vec![0.0f32; out_capacity];
        let mut output = Vec::with_capacity(expected_len + out_capacity);

        for chunk in samples.chunks(CHUNK_FRAMES) {
            scratch_in[..chunk.len()].copy_from_slice(chunk);
            scratch_in[chunk.len()..].fill(0.0);

            let input = InterleavedSlice::new(&scratch_in, 1, CHUNK_FRAMES).map_err(|e| {
                CoreError::Audio {
                    reason: format!("bad input buffer: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;
            let mut out = InterleavedSlice::new_mut(&mut scratch_out, 1, out_capacity).map_err(
                |e| CoreError::Audio {
                    reason: format!("bad output buffer: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                },
            )?;

            let (_, written) = self
                .inner
                .process_into_buffer(&input, &mut out, None)
                .map_err(|e| CoreError::Audio {
                    reason: format!("resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&scratch_out[..written]);
        }

        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            "Utterance resampled"
        );

        Ok(output)
    }
}
