//! High-level audio engine API

use core::marker::PhantomData;

use tracing::debug;

use crate::graph::AudioGraph;
use crate::node::{AudioNode, NodeId, BLOCK_SIZE};
use crate::nodes::Mixer;

#[cfg(feature = "cpal_sink")]
use crate::device::OutputDevice;
#[cfg(feature = "cpal_sink")]
use crate::error::EngineError;

/// A handle for sending messages to a node in the [`Engine`].
///
/// Handles are returned by [`Engine::add`]. They are used to wire nodes
/// together and to push parameter updates, which the node picks up at the
/// start of its next block.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: rtrb::Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node.
    ///
    /// Lock-free. Returns `Err(msg)` if the node's queue is full.
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// The audio engine: one graph at a fixed sample rate, a stereo destination
/// bus, and an optional output sink behind it.
///
/// ```
/// use schwebung::Engine;
/// use schwebung::nodes::{Gain, Oscillator, RtrbSink};
///
/// let (producer, _consumer) = rtrb::RingBuffer::new(4096);
/// let mut engine = Engine::new(48_000).with_output(RtrbSink::stereo(producer));
///
/// let osc = engine.add(Oscillator::new(220.0));
/// let gain = engine.add(Gain::new(0.5));
/// engine.connect(&osc, &gain);
/// engine.output(&gain);
///
/// engine.process();
/// ```
pub struct Engine {
    graph: AudioGraph,
    sample_rate: u32,
    channels: usize,

    /// Mixer every voice is summed into
    destination: NodeId,
    /// Output sink fed by the destination bus
    sink_node: Option<NodeId>,

    blocks_processed: u64,
}

impl Engine {
    /// Create an engine with an explicit sample rate and no output sink.
    pub fn new(sample_rate: u32) -> Self {
        let channels = 2;
        let mut graph = AudioGraph::new(sample_rate);
        let (destination, _) = graph.add(Mixer::new(channels));
        // Without a sink the bus itself is the end of the graph
        graph.set_terminal(destination);

        Self {
            graph,
            sample_rate,
            channels,
            destination,
            sink_node: None,
            blocks_processed: 0,
        }
    }

    /// Create an engine rendering to the system's default output device.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Result<Self, EngineError> {
        let device = OutputDevice::default_output()?;
        let sink = device.create_sink()?;
        Ok(Self::new(device.sample_rate()).with_output(sink))
    }

    /// Attach the output sink (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        if let Some(old) = self.sink_node.take() {
            self.graph.remove(old);
        }
        let (sink_id, _) = self.graph.add(sink);
        self.graph.connect(self.destination, sink_id);
        self.graph.set_terminal(sink_id);
        self.sink_node = Some(sink_id);
        self
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels on the destination bus.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Seconds of audio rendered so far.
    pub fn current_time(&self) -> f64 {
        (self.blocks_processed * BLOCK_SIZE as u64) as f64 / self.sample_rate as f64
    }

    /// Add a node. It stays silent until it is connected towards the output.
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let (node_id, sender) = self.graph.add(node);
        debug!(node = ?node_id, "node added");
        Handle {
            node_id,
            sender,
            _marker: PhantomData,
        }
    }

    /// Route audio from `from` into `to`.
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>)
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        if !self.graph.connect(from.node_id, to.node_id) {
            debug!(from = ?from.node_id, to = ?to.node_id, "connect skipped, node removed");
        }
    }

    /// Connect a node to the destination bus.
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) {
        self.graph.connect(handle.node_id, self.destination);
    }

    /// Remove a node and all of its connections.
    ///
    /// Removing a node twice is harmless.
    pub fn remove<M: Send + 'static>(&mut self, handle: Handle<M>) {
        if self.graph.remove(handle.node_id) {
            debug!(node = ?handle.node_id, "node removed");
        }
    }

    /// Whether the node behind `handle` is still part of the graph.
    pub fn contains<M: Send + 'static>(&self, handle: &Handle<M>) -> bool {
        self.graph.contains(handle.node_id)
    }

    /// Total number of nodes, including the destination bus and sink.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Process one block of [`BLOCK_SIZE`] frames.
    ///
    /// Call this repeatedly, paced to stay slightly ahead of real time.
    pub fn process(&mut self) {
        self.graph.process();
        self.blocks_processed += 1;
    }
}
