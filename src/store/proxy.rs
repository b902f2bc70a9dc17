//! Restricted views handed to collaborators instead of the full store.

use std::rc::Rc;

use super::binding::Binding;
use super::message::Message;
use super::mirror::{MirrorSubscription, ObservableMirror};
use super::owner::{OwnerClient, StateStream};
use super::task::{DispatchOptions, StoreTask};

type Dispatch<A> = Rc<dyn Fn(A, DispatchOptions) -> StoreTask>;

/// `{state, bind, dispatch}` over a store or a scoped part of one.
pub struct ViewProxy<A, S> {
    read: Rc<dyn Fn() -> S>,
    write: Rc<dyn Fn(S) -> StoreTask>,
    send: Dispatch<A>,
}

impl<A, S> Clone for ViewProxy<A, S> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
            write: Rc::clone(&self.write),
            send: Rc::clone(&self.send),
        }
    }
}

impl<A: 'static, S: 'static> ViewProxy<A, S> {
    pub(crate) fn new(
        read: impl Fn() -> S + 'static,
        write: impl Fn(S) -> StoreTask + 'static,
        send: impl Fn(A, DispatchOptions) -> StoreTask + 'static,
    ) -> Self {
        Self {
            read: Rc::new(read),
            write: Rc::new(write),
            send: Rc::new(send),
        }
    }

    pub fn state(&self) -> S {
        (self.read)()
    }

    pub fn bind(&self) -> Binding<S> {
        let read = Rc::clone(&self.read);
        let write = Rc::clone(&self.write);
        Binding::new(move || read(), move |state| write(state))
    }

    pub fn dispatch(&self, action: A) -> StoreTask {
        (self.send)(action, DispatchOptions::default())
    }

    pub fn dispatch_with(&self, action: A, options: DispatchOptions) -> StoreTask {
        (self.send)(action, options)
    }

    /// Narrow the proxy to a sub-state with its own action type.
    ///
    /// `to_local` projects the sub-state, `embed` writes a changed sub-state
    /// back into a copy of the parent, and `from_local` lifts local actions.
    pub fn scope<LA: 'static, LS: 'static>(
        &self,
        to_local: impl Fn(&S) -> LS + 'static,
        embed: impl Fn(&mut S, LS) + 'static,
        from_local: impl Fn(LA) -> A + 'static,
    ) -> ViewProxy<LA, LS> {
        let to_local = Rc::new(to_local);

        let read = Rc::clone(&self.read);
        let project = Rc::clone(&to_local);
        let local_read = move || project(&read());

        let read = Rc::clone(&self.read);
        let write = Rc::clone(&self.write);
        let local_write = move |local: LS| {
            let mut parent = read();
            embed(&mut parent, local);
            write(parent)
        };

        let send = Rc::clone(&self.send);
        let local_send = move |action: LA, options| send(from_local(action), options);

        ViewProxy::new(local_read, local_write, local_send)
    }
}

/// `{subscribe, updates, dispatch}` for push-style consumers.
pub struct ObservedStore<A, S> {
    mirror: ObservableMirror<S>,
    owner: OwnerClient<Message<A, S>, S>,
    send: Dispatch<A>,
}

impl<A, S> Clone for ObservedStore<A, S> {
    fn clone(&self) -> Self {
        Self {
            mirror: self.mirror.clone(),
            owner: self.owner.clone(),
            send: Rc::clone(&self.send),
        }
    }
}

impl<A: 'static, S: Clone + 'static> ObservedStore<A, S> {
    pub(crate) fn new(
        mirror: ObservableMirror<S>,
        owner: OwnerClient<Message<A, S>, S>,
        send: impl Fn(A, DispatchOptions) -> StoreTask + 'static,
    ) -> Self {
        Self {
            mirror,
            owner,
            send: Rc::new(send),
        }
    }

    /// Mirror observer on the UI thread.
    pub fn subscribe(&self, observer: impl Fn(&S) + 'static) -> MirrorSubscription {
        self.mirror.subscribe(observer)
    }

    /// Canonical state stream, usable from any task.
    pub fn updates(&self) -> StateStream<S> {
        self.owner.subscribe()
    }

    pub fn dispatch(&self, action: A) -> StoreTask {
        (self.send)(action, DispatchOptions::default())
    }

    pub fn dispatch_with(&self, action: A, options: DispatchOptions) -> StoreTask {
        (self.send)(action, options)
    }
}
