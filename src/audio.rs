use crate::constants::{MAX_PRE_DELAY_SEC, NOTE_START_OFFSET_SEC, OSC_STOP_PADDING_SEC};
use pulsegrid_core::constants::{ANALYSER_FFT_SIZE, SYNTH_VOICE_PEAK};
use pulsegrid_core::{
    reverb_impulse_response, AudioSession, Clock, Debouncer, Envelope, Note, NoteSink, SetupError,
    SynthSettings, TimeSource, TriggerError,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

#[inline]
fn js_err(e: JsValue) -> String {
    format!("{:?}", e)
}

// Create a GainNode with an initial value; logs on failure
fn create_gain(
    audio_ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> Result<web::GainNode, SetupError> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {} GainNode error: {:?}", label, e);
            Err(SetupError::Audio(js_err(e)))
        }
    }
}

// ===================== Visualizer playback =====================

/// One decoded file routed source -> analyser -> destination.
pub struct WebAudioSession {
    ctx: web::AudioContext,
    source: web::AudioBufferSourceNode,
    analyser: web::AnalyserNode,
    playing: bool,
    started: bool,
    stopped: bool,
}

impl WebAudioSession {
    pub fn new(ctx: &web::AudioContext, buffer: &web::AudioBuffer) -> Result<Self, SetupError> {
        let audio = |e: JsValue| SetupError::Audio(js_err(e));
        let analyser = ctx.create_analyser().map_err(audio)?;
        analyser.set_fft_size(ANALYSER_FFT_SIZE);
        let source = ctx.create_buffer_source().map_err(audio)?;
        source.set_buffer(Some(buffer));
        source.connect_with_audio_node(&analyser).map_err(audio)?;
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(audio)?;
        Ok(Self {
            ctx: ctx.clone(),
            source,
            analyser,
            playing: false,
            started: false,
            stopped: false,
        })
    }
}

impl AudioSession for WebAudioSession {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn frequency_bins(&self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn start(&mut self) {
        if self.stopped {
            return;
        }
        // the context may still be suspended from a previous pause
        _ = self.ctx.resume();
        match self.source.start() {
            Ok(()) => {
                self.started = true;
                self.playing = true;
            }
            Err(e) => log::error!("[audio] source start failed: {:?}", e),
        }
    }

    fn suspend(&mut self) {
        _ = self.ctx.suspend();
        self.playing = false;
    }

    fn resume(&mut self) {
        _ = self.ctx.resume();
        self.playing = self.started && !self.stopped;
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        // stop() throws if start() never ran; the disconnect still matters
        _ = self.source.stop();
        _ = self.source.disconnect();
        _ = self.analyser.disconnect();
        self.stopped = true;
        self.playing = false;
    }
}

/// Read and decode a user-selected file on `ctx`.
pub async fn decode_file(
    ctx: &web::AudioContext,
    file: &web::File,
) -> anyhow::Result<web::AudioBuffer> {
    let bytes = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow::anyhow!("read failed: {:?}", e))?;
    let bytes: js_sys::ArrayBuffer = bytes
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("not an ArrayBuffer: {:?}", e))?;
    let promise = ctx
        .decode_audio_data(&bytes)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let decoded = JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("decode failed: {:?}", e))?;
    decoded
        .dyn_into::<web::AudioBuffer>()
        .map_err(|e| anyhow::anyhow!("not an AudioBuffer: {:?}", e))
}

// ===================== Grid synth =====================

/// Triangle-voice synth with a convolution reverb send.
///
/// master -> destination (dry synth)
/// master -> pre-delay -> convolver -> wet -> destination
/// master -> reverb dry -> destination
pub struct SynthChain {
    ctx: web::AudioContext,
    master: web::GainNode,
    pre_delay: web::DelayNode,
    convolver: web::ConvolverNode,
    wet: web::GainNode,
    reverb_dry: web::GainNode,
    envelope: Envelope,
    settings: SynthSettings,
    rebuild: Debouncer,
    clock: Clock,
}

impl SynthChain {
    pub fn new(ctx: &web::AudioContext) -> Result<Self, SetupError> {
        let audio = |e: JsValue| SetupError::Audio(js_err(e));
        let settings = SynthSettings::default();
        let destination = ctx.destination();

        let master = create_gain(ctx, settings.master_gain(), "Master")?;
        let pre_delay = ctx
            .create_delay_with_max_delay_time(MAX_PRE_DELAY_SEC)
            .map_err(audio)?;
        pre_delay
            .delay_time()
            .set_value(settings.reverb_pre_delay_sec());
        let convolver = web::ConvolverNode::new(ctx).map_err(audio)?;
        convolver.set_normalize(true);
        let wet = create_gain(ctx, settings.reverb_wet(), "Reverb wet")?;
        let reverb_dry = create_gain(ctx, settings.reverb_dry(), "Reverb dry")?;

        master.connect_with_audio_node(&destination).map_err(audio)?;
        master.connect_with_audio_node(&pre_delay).map_err(audio)?;
        pre_delay.connect_with_audio_node(&convolver).map_err(audio)?;
        convolver.connect_with_audio_node(&wet).map_err(audio)?;
        wet.connect_with_audio_node(&destination).map_err(audio)?;
        master.connect_with_audio_node(&reverb_dry).map_err(audio)?;
        reverb_dry
            .connect_with_audio_node(&destination)
            .map_err(audio)?;

        let chain = Self {
            ctx: ctx.clone(),
            master,
            pre_delay,
            convolver,
            wet,
            reverb_dry,
            envelope: Envelope::default(),
            settings,
            rebuild: Debouncer::default(),
            clock: Clock::new(),
        };
        chain.load_impulse_response()?;
        Ok(chain)
    }

    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    pub fn set_volume_db(&mut self, db: f32) {
        self.settings.set_volume_db(db);
        self.master.gain().set_value(self.settings.master_gain());
    }

    pub fn set_reverb_wet(&mut self, wet: f32) {
        self.settings.set_reverb_wet(wet);
        self.wet.gain().set_value(self.settings.reverb_wet());
        self.reverb_dry.gain().set_value(self.settings.reverb_dry());
    }

    pub fn set_reverb_pre_delay_sec(&mut self, sec: f32) {
        self.settings.set_reverb_pre_delay_sec(sec);
        self.pre_delay
            .delay_time()
            .set_value(self.settings.reverb_pre_delay_sec());
    }

    /// The impulse response is rebuilt later, once the slider settles.
    pub fn set_reverb_decay_sec(&mut self, sec: f32) {
        if self.settings.set_reverb_decay_sec(sec) {
            self.rebuild.poke(self.clock.elapsed_sec());
        }
    }

    /// Called every frame; rebuilds the reverb when a decay change settled.
    pub fn poll_rebuild(&mut self) {
        if self.rebuild.poll(self.clock.elapsed_sec()) {
            if let Err(e) = self.load_impulse_response() {
                log::error!("[synth] reverb rebuild failed: {}", e);
            }
        }
    }

    /// Browsers start contexts suspended until a user gesture.
    pub fn resume(&self) {
        _ = self.ctx.resume();
    }

    pub fn close(&mut self) {
        self.rebuild.cancel();
        _ = self.master.disconnect();
        _ = self.ctx.close();
    }

    fn load_impulse_response(&self) -> Result<(), SetupError> {
        let sr = self.ctx.sample_rate();
        let decay = self.settings.reverb_decay_sec();
        let [mut left, mut right] = reverb_impulse_response(sr, decay);
        let ir = self
            .ctx
            .create_buffer(2, left.len() as u32, sr)
            .map_err(|e| SetupError::Audio(js_err(e)))?;
        ir.copy_to_channel(&mut left, 0)
            .map_err(|e| SetupError::Audio(js_err(e)))?;
        ir.copy_to_channel(&mut right, 1)
            .map_err(|e| SetupError::Audio(js_err(e)))?;
        self.convolver.set_buffer(Some(&ir));
        log::info!("[synth] reverb impulse response {:.1}s @ {}Hz", decay, sr);
        Ok(())
    }

    fn play_note(&self, note: &Note, t0: f64, hold_sec: f32) -> Result<(), JsValue> {
        let osc = web::OscillatorNode::new(&self.ctx)?;
        osc.set_type(web::OscillatorType::Triangle);
        osc.frequency().set_value(note.frequency_hz());
        let env = web::GainNode::new(&self.ctx)?;
        let gain = env.gain();
        gain.set_value_at_time(0.0, t0)?;
        for (t, v) in self.envelope.breakpoints(t0, hold_sec, SYNTH_VOICE_PEAK) {
            gain.linear_ramp_to_value_at_time(v, t)?;
        }
        osc.connect_with_audio_node(&env)?;
        env.connect_with_audio_node(&self.master)?;
        osc.start_with_when(t0)?;
        osc.stop_with_when(self.envelope.end_time(t0, hold_sec) + OSC_STOP_PADDING_SEC)?;
        Ok(())
    }
}

impl NoteSink for SynthChain {
    fn play_cluster(&mut self, notes: &[Note], duration_sec: f32) -> Result<(), TriggerError> {
        if self.ctx.state() == web::AudioContextState::Closed {
            return Err(TriggerError::EngineUnavailable);
        }
        let t0 = self.ctx.current_time() + NOTE_START_OFFSET_SEC;
        for note in notes {
            self.play_note(note, t0, duration_sec)
                .map_err(|e| TriggerError::Node(js_err(e)))?;
        }
        Ok(())
    }
}
