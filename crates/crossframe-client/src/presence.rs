//! Service presence operations.
//!
//! String arguments are validated before being placed in the bag; an
//! empty id is simply omitted and the host reports the failure in its
//! reply, which matches how the console treats malformed presence
//! calls.

use crossframe_core::ArgBag;

use crate::console::versioned_args;
use crate::registry::ResponseCallback;
use crate::session::{DispatchOutcome, Session, SessionCallback};

fn set_valid(args: &mut ArgBag, key: &str, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    args.set(key, value);
    true
}

/// Service presence operations, borrowed from a console handle.
pub struct Presence<'a> {
    session: &'a mut Session,
}

impl<'a> Presence<'a> {
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

    /// Logs the presence user in with the given status.
    pub fn login(
        &mut self,
        status_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        set_valid(&mut args, "statusId", status_id);
        self.call("loginPresence", args, callback)
    }

    /// The presence user's current status id.
    pub fn get_service_presence_status_id(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getPresenceStatusId", versioned_args(), Some(callback))
    }

    /// Channels of the presence user's current status.
    pub fn get_service_presence_status_channels(
        &mut self,
        callback: ResponseCallback,
    ) -> DispatchOutcome {
        self.call("getPresenceStatusChannels", versioned_args(), Some(callback))
    }

    /// Changes the presence user's status.
    pub fn set_service_presence_status(
        &mut self,
        status_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        set_valid(&mut args, "statusId", status_id);
        self.call("setPresenceStatus", args, callback)
    }

    /// Logs the presence user out.
    pub fn logout(&mut self, callback: Option<ResponseCallback>) -> DispatchOutcome {
        self.call("logoutPresence", versioned_args(), callback)
    }

    /// Work items assigned to or opened by the presence user.
    pub fn get_agent_works(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getPresenceWorks", versioned_args(), Some(callback))
    }

    /// Accepts an assigned work item.
    pub fn accept_agent_work(
        &mut self,
        work_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        set_valid(&mut args, "workId", work_id);
        self.call("acceptPresenceWork", args, callback)
    }

    /// Declines an assigned work item, with an optional reason.
    pub fn decline_agent_work(
        &mut self,
        work_id: &str,
        decline_reason: Option<&str>,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        // The reason only travels alongside a valid work id.
        if set_valid(&mut args, "workId", work_id) {
            args.set_opt("declineReason", decline_reason);
        }
        self.call("declinePresenceWork", args, callback)
    }

    /// Closes an engaged work item.
    pub fn close_agent_work(
        &mut self,
        work_id: &str,
        callback: Option<ResponseCallback>,
    ) -> DispatchOutcome {
        let mut args = versioned_args();
        set_valid(&mut args, "workId", work_id);
        self.call("closePresenceWork", args, callback)
    }

    /// Configured capacity and currently assigned workload.
    pub fn get_agent_workload(&mut self, callback: ResponseCallback) -> DispatchOutcome {
        self.call("getAgentWorkload", versioned_args(), Some(callback))
    }
}
