// Copyright 2025 Irreducible Inc.

use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};

use parking_lot::Mutex;

use crate::{HandleId, NativeError, NativeOp, Status};

pub(super) type SharedRegistry = Arc<Mutex<Registry>>;

/// Makes a native call report `status` instead of succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
	op: NativeOp,
	countdown: usize,
	status: Status,
}

impl Fault {
	/// Fails the next call of `op`.
	pub const fn new(op: NativeOp, status: Status) -> Self {
		Self {
			op,
			countdown: 1,
			status,
		}
	}

	/// Fails the `n`-th call of the operation counted from the moment the fault is injected.
	pub fn on_call(mut self, n: usize) -> Self {
		self.countdown = n.max(1);
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifetimes {
	pub created: usize,
	pub destroyed: usize,
}

impl Lifetimes {
	pub const fn live(&self) -> usize {
		self.created - self.destroyed
	}
}

/// Creation and destruction counts per handle kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleStats {
	pub linalg: Lifetimes,
	pub device_generators: Lifetimes,
	pub host_streams: Lifetimes,
}

impl HandleStats {
	pub const fn live(&self) -> usize {
		self.linalg.live() + self.device_generators.live() + self.host_streams.live()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum HandleKind {
	Linalg,
	DeviceGenerator,
	HostStream,
}

#[derive(Debug, Default)]
pub(super) struct Registry {
	next_id: u64,
	live: HashSet<(HandleKind, HandleId)>,
	stats: HandleStats,
	calls: HashMap<NativeOp, usize>,
	faults: Vec<Fault>,
}

impl Registry {
	/// Records a call of `op` and fires the first injected fault that comes due.
	pub fn enter(&mut self, op: NativeOp) -> Result<(), NativeError> {
		*self.calls.entry(op).or_default() += 1;

		let mut fired = None;
		self.faults.retain_mut(|fault| {
			if fault.op != op {
				return true;
			}
			fault.countdown -= 1;
			if fault.countdown == 0 {
				fired.get_or_insert(fault.status);
				false
			} else {
				true
			}
		});

		match fired {
			Some(status) => status.check(op),
			None => Ok(()),
		}
	}

	pub fn acquire(&mut self, op: NativeOp, kind: HandleKind) -> Result<HandleId, NativeError> {
		self.enter(op)?;
		self.next_id += 1;
		let id = HandleId(self.next_id);
		self.live.insert((kind, id));
		self.lifetimes_mut(kind).created += 1;
		Ok(id)
	}

	pub fn release(
		&mut self,
		op: NativeOp,
		kind: HandleKind,
		id: HandleId,
	) -> Result<(), NativeError> {
		self.enter(op)?;
		if !self.live.remove(&(kind, id)) {
			return Err(NativeError::new(op, Status::INVALID_VALUE));
		}
		self.lifetimes_mut(kind).destroyed += 1;
		Ok(())
	}

	pub fn inject(&mut self, fault: Fault) {
		self.faults.push(fault);
	}

	pub fn stats(&self) -> HandleStats {
		self.stats
	}

	pub fn calls(&self, op: NativeOp) -> usize {
		self.calls.get(&op).copied().unwrap_or(0)
	}

	pub fn is_live(&self, id: HandleId) -> bool {
		self.live.iter().any(|&(_, live_id)| live_id == id)
	}

	fn lifetimes_mut(&mut self, kind: HandleKind) -> &mut Lifetimes {
		match kind {
			HandleKind::Linalg => &mut self.stats.linalg,
			HandleKind::DeviceGenerator => &mut self.stats.device_generators,
			HandleKind::HostStream => &mut self.stats.host_streams,
		}
	}
}
