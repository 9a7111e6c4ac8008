//! Telephony (CTI) operations.

use crossframe_core::ArgBag;

use crate::console::versioned_args;
use crate::registry::{EventHandler, EventKind, ResponseCallback};
use crate::session::{DispatchOutcome, Session, SessionCallback};

/// Telephony operations, borrowed from a console handle.
pub struct Cti<'a> {
    session: &'a mut Session,
}

impl<'a> Cti<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn call(
        &mut self,
        name: &str,
        args: ArgBag,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        self.session
            .execute(name, args, callback.map(SessionCallback::Response))
    }

    fn subscribe_plain(&mut self, name: &str, handler: EventHandler) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        self.session.execute(
            name,
            args,
            Some(SessionCallback::event(EventKind::Plain, handler)),
        )
    }

    /// Active call object ids, in arrival order.
    pub fn get_call_object_ids(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getCallObjectIds", versioned_args(), Some(callback))
    }

    /// Replaces the set of active call object ids.
    pub fn set_call_object_ids(
        &mut self,
        call_object_ids: Vec<String>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("callObjectIds", call_object_ids);
        self.call("setCallObjectIds", args, callback)
    }

    /// Attached data of a call, from the screen pop payload. Set
    /// `with_call_type` to also receive the call type.
    pub fn get_call_attached_data(
        &mut self,
        call_object_id: &str,
        with_call_type: Option<bool>,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("callObjectId", call_object_id);
        if let Some(with_call_type) = with_call_type {
            args.set("getCallType", with_call_type);
        }
        self.call("getCallAttachedData", args, Some(callback))
    }

    /// Sets the data attached to a call object id.
    pub fn set_call_attached_data(
        &mut self,
        call_object_id: &str,
        call_data: &str,
        call_type: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("callObjectId", call_object_id);
        args.set("callData", call_data);
        args.set("callType", call_type);
        self.call("setCallAttachedData", args, callback)
    }

    /// Fires when a call begins.
    pub fn on_call_begin(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onCallBegin", handler)
    }

    /// Announces that a call has started.
    pub fn fire_on_call_begin(
        &mut self,
        call_object_id: &str,
        call_type: &str,
        call_label: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("callObjectId", call_object_id);
        args.set("callType", call_type);
        args.set("callLabel", call_label);
        self.call("fireOnCallBegin", args, callback)
    }

    /// Announces that a call has ended.
    pub fn fire_on_call_end(
        &mut self,
        call_object_id: &str,
        call_duration: &str,
        call_disposition: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("callObjectId", call_object_id);
        args.set("callDuration", call_duration);
        args.set("callDisposition", call_disposition);
        self.call("fireOnCallEnd", args, callback)
    }

    /// Fires when a call ends.
    ///
    /// Bound to one call when `call_object_id` is given: the handler
    /// then fires once, for that call only, and is removed. An unbound
    /// handler fires for every call and persists.
    pub fn on_call_end(
        &mut self,
        handler: EventHandler,
        call_object_id: Option<&str>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("event", true);
        // An absent id goes out as the literal string "null".
        args.set("callObjectId", call_object_id.unwrap_or("null"));
        self.session.execute(
            "onCallEnd",
            args,
            Some(SessionCallback::event(
                EventKind::EndCall {
                    call_object_id: call_object_id.map(str::to_owned),
                },
                handler,
            )),
        )
    }

    /// Sends a message to the CTI adapter.
    pub fn send_cti_message(
        &mut self,
        msg: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("msg", msg);
        self.call("sendCTIMessage", args, callback)
    }

    /// Fires when a CTI message is sent from any frame.
    pub fn on_send_cti_message(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onSendCTIMessage", handler)
    }

    /// Fires when the interaction log saves a call log.
    pub fn on_call_log_saved(&mut self, handler: EventHandler) -> DispatchOutcome {
        self.subscribe_plain("onCallLogSaved", handler)
    }

    /// Announces that a call log was saved.
    pub fn fire_on_call_log_saved(
        &mut self,
        id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        args.set("id", id);
        self.call("fireOnCallLogSaved", args, callback)
    }
}
